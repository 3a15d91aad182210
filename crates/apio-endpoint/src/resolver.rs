//! Path to routes resolution.
//!
//! Routes for different model types share one table, so they are stored
//! type-erased and recovered by downcasting to the `Routes<T>` the caller
//! expects.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use apio_routes::Routes;

/// Type-erased `Routes<T>`.
pub type ErasedRoutes = Arc<dyn Any + Send + Sync>;

/// Maps a path segment to the routes registered for it.
pub trait RoutesResolver: Send + Sync {
    /// Returns the routes registered at `path`, type-erased.
    fn resolve(&self, path: &str) -> Option<ErasedRoutes>;
}

impl<R: RoutesResolver + ?Sized> RoutesResolver for Arc<R> {
    fn resolve(&self, path: &str) -> Option<ErasedRoutes> {
        (**self).resolve(path)
    }
}

impl<R: RoutesResolver + ?Sized> RoutesResolver for &R {
    fn resolve(&self, path: &str) -> Option<ErasedRoutes> {
        (**self).resolve(path)
    }
}

/// Resolves `path` and recovers its `Routes<T>`.
///
/// Returns `None` if nothing is registered at `path` or if the routes there
/// serve a different model type.
pub fn resolve_routes<T: 'static>(
    resolver: &(impl RoutesResolver + ?Sized),
    path: &str,
) -> Option<Arc<Routes<T>>> {
    resolver
        .resolve(path)
        .and_then(|erased| erased.downcast::<Routes<T>>().ok())
}

/// A plain path-keyed routes table.
///
/// # Example
///
/// ```
/// use apio_endpoint::{resolve_routes, RoutesTable};
/// use apio_routes::Routes;
///
/// struct Folder;
/// struct Document;
///
/// let table = RoutesTable::new().with("folders", Routes::<Folder>::builder().build());
///
/// assert!(resolve_routes::<Folder>(&table, "folders").is_some());
/// assert!(resolve_routes::<Document>(&table, "folders").is_none());
/// assert!(resolve_routes::<Folder>(&table, "documents").is_none());
/// ```
#[derive(Default, Clone)]
pub struct RoutesTable {
    routes: HashMap<String, ErasedRoutes>,
}

impl RoutesTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `routes` at `path`, returning `false` if the path was taken.
    /// A taken path keeps its earlier routes.
    pub fn register<T: 'static>(&mut self, path: impl Into<String>, routes: Routes<T>) -> bool {
        self.register_erased(path.into(), Arc::new(routes))
    }

    pub(crate) fn register_erased(&mut self, path: String, routes: ErasedRoutes) -> bool {
        if self.routes.contains_key(&path) {
            return false;
        }
        self.routes.insert(path, routes);
        true
    }

    /// Registers `routes` at `path`, consuming and returning the table.
    #[must_use]
    pub fn with<T: 'static>(mut self, path: impl Into<String>, routes: Routes<T>) -> Self {
        self.register(path, routes);
        self
    }

    /// Returns `true` if routes are registered at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Returns the registered paths, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Returns the number of registered paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RoutesResolver for RoutesTable {
    fn resolve(&self, path: &str) -> Option<ErasedRoutes> {
        self.routes.get(path).cloned()
    }
}

impl fmt::Debug for RoutesTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&str> = self.paths().collect();
        paths.sort_unstable();
        f.debug_struct("RoutesTable").field("paths", &paths).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Folder;

    #[test]
    fn test_register_rejects_taken_path() {
        let mut table = RoutesTable::new();

        assert!(table.register("folders", Routes::<Folder>::builder().build()));
        assert!(!table.register("folders", Routes::<String>::builder().build()));
        assert_eq!(table.len(), 1);
        assert!(resolve_routes::<Folder>(&table, "folders").is_some());
    }

    #[test]
    fn test_resolver_through_arc() {
        let table = Arc::new(RoutesTable::new().with("folders", Routes::<Folder>::builder().build()));

        assert!(table.contains("folders"));
        assert!(resolve_routes::<Folder>(&table, "folders").is_some());
        assert!(table.resolve("missing").is_none());
    }
}
