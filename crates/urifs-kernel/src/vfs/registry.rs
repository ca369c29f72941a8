//! Backend registry with longest-prefix routing.
//!
//! Routes URIs to the backend that owns their prefix.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use urifs_glob::split_scheme;

use super::backend::Backend;
use super::backends::{InvalidBackend, LocalBackend};
use super::handle::Handle;

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// Information about a registered backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    /// The URI prefix (e.g., "mem://").
    pub prefix: String,
    /// Whether the backend lacks a writer.
    pub read_only: bool,
}

/// Maps URI prefixes to backends.
///
/// Prefixes are matched longest first. If `mem://` and `mem://cache/` are
/// both registered, `mem://cache/x` routes to the second with path `x`.
/// A URI without a scheme goes to the default local backend; an empty URI
/// or an unknown scheme resolves to the invalid backend.
pub struct Registry {
    /// Backends, keyed by prefix.
    backends: RwLock<BTreeMap<String, Arc<dyn Backend>>>,
    /// Fallback for unprefixed paths; also registered under `file://`.
    local: Arc<dyn Backend>,
    invalid: Arc<dyn Backend>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("prefixes", &self.backends.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry holding only the host local backend.
    pub fn new() -> Self {
        let local: Arc<dyn Backend> = Arc::new(LocalBackend::host());
        let mut backends = BTreeMap::new();
        backends.insert(local.prefix().to_string(), Arc::clone(&local));
        Self {
            backends: RwLock::new(backends),
            local,
            invalid: Arc::new(InvalidBackend),
        }
    }

    /// The process-wide default registry.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Register a backend under its prefix.
    ///
    /// A prefix only matches at a path boundary: `mem://cache` owns
    /// `mem://cache` and `mem://cache/x` but not `mem://cachefoo`. Prefixes
    /// ending in `/` (including a bare `scheme://`) match anything after
    /// them.
    ///
    /// Returns the backend it replaced, if the prefix was taken.
    pub fn register(&self, backend: Arc<dyn Backend>) -> Option<Arc<dyn Backend>> {
        let prefix = backend.prefix().to_string();
        let previous = self.backends.write().insert(prefix.clone(), backend);
        tracing::debug!(%prefix, replaced = previous.is_some(), "registered backend");
        previous
    }

    /// Unregister a backend.
    ///
    /// Only removes the entry if `backend` is still the registered owner of
    /// its prefix; a backend that was already replaced cannot evict its
    /// successor. Returns `true` if an entry was removed.
    pub fn unregister(&self, backend: &Arc<dyn Backend>) -> bool {
        let prefix = backend.prefix();
        let mut backends = self.backends.write();
        let owned = backends
            .get(prefix)
            .is_some_and(|current| std::ptr::addr_eq(Arc::as_ptr(current), Arc::as_ptr(backend)));
        if owned {
            backends.remove(prefix);
            tracing::debug!(%prefix, "unregistered backend");
        }
        owned
    }

    /// Look up the backend registered under exactly `prefix`.
    pub fn get(&self, prefix: &str) -> Option<Arc<dyn Backend>> {
        self.backends.read().get(prefix).cloned()
    }

    /// Snapshot of registered prefixes.
    pub fn backends(&self) -> Vec<BackendInfo> {
        self.backends
            .read()
            .iter()
            .map(|(prefix, backend)| BackendInfo {
                prefix: prefix.clone(),
                read_only: backend.writer().is_none(),
            })
            .collect()
    }

    /// Split a URI into its backend and clean backend-relative path.
    pub fn resolve(&self, uri: &str) -> (Arc<dyn Backend>, String) {
        if uri.is_empty() {
            return (Arc::clone(&self.invalid), String::new());
        }

        let best = {
            let backends = self.backends.read();
            backends
                .iter()
                .filter(|(prefix, _)| owns(prefix, uri))
                .max_by_key(|(prefix, _)| prefix.len())
                .map(|(prefix, backend)| (prefix.len(), Arc::clone(backend)))
        };

        if let Some((len, backend)) = best {
            let path = backend.clean(&uri[len..]);
            return (backend, path);
        }

        if split_scheme(uri).is_some() {
            tracing::trace!(%uri, "no backend for scheme");
            return (Arc::clone(&self.invalid), String::new());
        }

        let path = self.local.clean(uri);
        (Arc::clone(&self.local), path)
    }

    /// Resolve a URI into a [`Handle`].
    pub fn handle(&self, uri: &str) -> Handle {
        let (backend, path) = self.resolve(uri);
        if backend.is_invalid() {
            return Handle::invalid();
        }
        Handle::new(backend, &path)
    }
}

/// True if `prefix` owns `uri`, matching only at a `/` boundary.
fn owns(prefix: &str, uri: &str) -> bool {
    match uri.strip_prefix(prefix) {
        Some(rest) => prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
