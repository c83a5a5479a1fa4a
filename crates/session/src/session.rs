use crate::directory::ActiveDirectory;
use crate::inflight::InFlight;
use crate::resolver;
use hv_client::{Endpoints, Transport};
use hv_core::{HvError, ResolveMode, Result, Status, StatusSurface};
use hv_render::Renderer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Behaviour knobs of a [`Session`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub endpoints:    Endpoints,
    /// Allow `multi.json` batching when the transport supports it.
    pub batch:        bool,
    pub resolve_mode: ResolveMode,
}

/// Connection state shared by every render, reset and listing call: the
/// cached active directory and the in-flight flags of each render target.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    renderer:  Renderer,
    status:    Arc<dyn StatusSurface>,
    options:   SessionOptions,
    cache:     Mutex<Option<Arc<ActiveDirectory>>>,
    inflight:  InFlight,
    /// A deferred resolution task is running.
    resolving: AtomicBool,
}

impl Session {
    pub fn new(
        transport: Arc<dyn Transport>,
        renderer: Renderer,
        status: Arc<dyn StatusSurface>,
        options: SessionOptions,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                renderer,
                status,
                options,
                cache:     Mutex::new(None),
                inflight:  InFlight::new(),
                resolving: AtomicBool::new(false),
            }),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn options(&self) -> &SessionOptions {
        &self.inner.options
    }

    pub fn renderer(&self) -> &Renderer {
        &self.inner.renderer
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub(crate) fn inflight(&self) -> &InFlight {
        &self.inner.inflight
    }

    /// Whether a render touching `target` is outstanding.
    pub fn is_busy(&self, target: &str) -> bool {
        self.inner.inflight.is_busy(target)
    }

    pub fn report(&self, status: Status) {
        self.inner.status.report(status);
    }

    // ── Directory cache ───────────────────────────────────────────────────────

    /// The cached active directory, if resolution has succeeded.
    pub fn active_directory(&self) -> Option<Arc<ActiveDirectory>> {
        self.cache().clone()
    }

    /// Drop the cached directory so the next call resolves again.
    pub fn invalidate(&self) {
        if self.cache().take().is_some() {
            debug!("Directory cache cleared");
        }
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, Option<Arc<ActiveDirectory>>> {
        self.inner.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the listing and cache the active directory.
    ///
    /// On failure the cache is left empty and the error is reported.
    pub async fn resolve(&self) -> Result<Arc<ActiveDirectory>> {
        match resolver::fetch_active_directory(self.transport()).await {
            Ok(dir) => {
                info!(
                    "Active directory '{}' ({} entries, {} sub-directories)",
                    dir.path,
                    dir.descriptors.len(),
                    dir.subdirectories.len()
                );
                let dir = Arc::new(dir);
                *self.cache() = Some(Arc::clone(&dir));
                Ok(dir)
            }
            Err(e) => {
                self.invalidate();
                warn!("Directory resolution failed: {e}");
                self.report(Status::error(resolve_failure_text(&e)));
                Err(e)
            }
        }
    }

    /// Start resolution in the background.  The handle is the deferred result;
    /// the cache is filled when it completes.
    pub fn resolve_deferred(&self) -> JoinHandle<Result<Arc<ActiveDirectory>>> {
        let session = self.clone();
        tokio::spawn(async move { session.resolve().await })
    }

    /// Cached directory, or resolve according to the configured mode.
    ///
    /// `Ok(None)` means resolution was handed to a background task and the
    /// caller should give up on this call.
    pub(crate) async fn directory(&self) -> Result<Option<Arc<ActiveDirectory>>> {
        if let Some(dir) = self.active_directory() {
            return Ok(Some(dir));
        }
        match self.inner.options.resolve_mode {
            ResolveMode::Blocking => self.resolve().await.map(Some),
            ResolveMode::Deferred => {
                if !self.inner.resolving.swap(true, Ordering::SeqCst) {
                    let session = self.clone();
                    tokio::spawn(async move {
                        let _ = session.resolve().await;
                        session.inner.resolving.store(false, Ordering::SeqCst);
                    });
                }
                Ok(None)
            }
        }
    }

    /// Cached directory, resolving in place if needed regardless of mode.
    pub(crate) async fn resolved_directory(&self) -> Result<Arc<ActiveDirectory>> {
        match self.active_directory() {
            Some(dir) => Ok(dir),
            None => self.resolve().await,
        }
    }
}

fn resolve_failure_text(e: &HvError) -> String {
    match e {
        HvError::Transport(_) => {
            format!("Couldn't get the directory listing: {e}. Is the histogram server running?")
        }
        _ => format!("Couldn't find histograms on the server: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, FakeTransport, DIR, LISTING_JSON};
    use hv_core::StatusLevel;

    #[tokio::test]
    async fn resolve_caches_the_directory() {
        let transport = FakeTransport::new().route("h.json", LISTING_JSON);
        let (session, _sink, _status) = fixture(transport.clone());

        let first = session.resolve().await.unwrap();
        assert_eq!(first.path, DIR);
        assert_eq!(session.active_directory().as_deref(), Some(first.as_ref()));

        // Resolving again against an unchanged server yields the same thing.
        let second = session.resolve().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.count("GET"), 2);
    }

    #[tokio::test]
    async fn failed_resolve_empties_cache() {
        let transport = FakeTransport::new().route("h.json", LISTING_JSON);
        let (session, _sink, status) = fixture(transport.clone());
        session.resolve().await.unwrap();

        transport.fail("h.json");
        assert!(session.resolve().await.unwrap_err().is_transport());
        assert!(session.active_directory().is_none());
        let last = status.latest().unwrap();
        assert_eq!(last.level, StatusLevel::Error);
        assert!(last.text.contains("Is the histogram server running?"), "{}", last.text);
    }

    #[tokio::test]
    async fn listing_without_histograms_is_not_found() {
        let transport = FakeTransport::new().route("h.json", r#"{"_childs":[{"_name":"Files"}]}"#);
        let (session, _sink, _status) = fixture(transport);
        assert!(matches!(session.resolve().await, Err(HvError::DirectoryNotFound)));
    }

    #[tokio::test]
    async fn deferred_handle_fills_the_cache() {
        let transport = FakeTransport::new().route("h.json", LISTING_JSON);
        let (session, _sink, _status) = fixture(transport);

        let dir = session.resolve_deferred().await.unwrap().unwrap();
        assert_eq!(session.active_directory(), Some(dir));
    }

    #[tokio::test]
    async fn invalidate_forces_a_new_listing() {
        let transport = FakeTransport::new().route("h.json", LISTING_JSON);
        let (session, _sink, _status) = fixture(transport.clone());

        session.resolved_directory().await.unwrap();
        session.resolved_directory().await.unwrap();
        assert_eq!(transport.count("GET"), 1);

        session.invalidate();
        session.resolved_directory().await.unwrap();
        assert_eq!(transport.count("GET"), 2);
    }
}
