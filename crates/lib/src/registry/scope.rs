use std::fmt;

use crate::resolve::DependencyResolver;

use super::ArtifactRegistry;

/// Where a constructor is being instantiated.
///
/// A scope is a path of ids under a root name, together with the registry
/// the instantiation happens against. Top-level units get a root named after
/// the unit; every dependency gets its own isolated root so it can be shared
/// between units without its path depending on the first unit that needed it.
#[derive(Clone)]
pub struct Scope<'r> {
  registry: &'r ArtifactRegistry,
  path: Vec<String>,
}

impl<'r> Scope<'r> {
  pub fn root(registry: &'r ArtifactRegistry, name: impl Into<String>) -> Self {
    Self {
      registry,
      path: vec![name.into()],
    }
  }

  pub fn child(&self, id: impl Into<String>) -> Self {
    let mut path = self.path.clone();
    path.push(id.into());
    Self {
      registry: self.registry,
      path,
    }
  }

  /// Path segments joined with `/`.
  pub fn path(&self) -> String {
    self.path.join("/")
  }

  pub fn root_name(&self) -> &str {
    &self.path[0]
  }

  pub fn registry(&self) -> &'r ArtifactRegistry {
    self.registry
  }

  /// A resolver with a fresh session, for constructors that resolve their own
  /// nested dependencies.
  pub fn resolver(&self) -> DependencyResolver<'r> {
    DependencyResolver::new(self.registry)
  }
}

impl fmt::Debug for Scope<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Scope").field(&self.path()).finish()
  }
}
