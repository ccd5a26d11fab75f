//! Navigation handle for code that has no router of its own (service
//! callbacks, form submit flows).
//!
//! The active router is bound explicitly through [`Navigator::register`] and
//! the navigator is passed to whoever needs it. Navigating before a router is
//! bound does nothing.

use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

pub trait Router: Send + Sync {
    fn push(&self, path: &str);
    fn replace(&self, path: &str);
}

#[derive(Clone, Default)]
pub struct Navigator {
    router: Arc<RwLock<Option<Arc<dyn Router>>>>,
}

impl Navigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `router`, replacing any router bound earlier.
    pub fn register(&self, router: Arc<dyn Router>) {
        *self
            .router
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(router);
    }

    pub fn unregister(&self) {
        *self
            .router
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.router
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Pushes `path`, or replaces the current entry when `replace` is set.
    pub fn navigate(&self, path: &str, replace: bool) {
        let router = self
            .router
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let Some(router) = router else {
            debug!("No router bound; dropping navigation to {path}");
            return;
        };

        if replace {
            router.replace(path);
        } else {
            router.push(path);
        }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// In-memory history stack.
#[derive(Debug, Default)]
pub struct HistoryRouter {
    entries: RwLock<Vec<String>>,
}

impl HistoryRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(path: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(vec![path.into()]),
        }
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Router for HistoryRouter {
    fn push(&self, path: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }

    fn replace(&self, path: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.pop();
        entries.push(path.to_string());
    }
}
