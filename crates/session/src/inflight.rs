use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Per-target "request outstanding" flags.
///
/// A target whose flag is set rejects new requests outright; nothing is
/// queued.  Flags are cleared when the owning [`InFlightGuard`] is dropped,
/// so a request that never completes keeps its targets blocked.
#[derive(Debug, Default, Clone)]
pub struct InFlight {
    busy: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every target, or none of them if any is already busy.
    pub fn try_acquire(&self, targets: &[String]) -> Option<InFlightGuard> {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        if targets.iter().any(|t| busy.contains(t)) {
            return None;
        }
        busy.extend(targets.iter().cloned());
        Some(InFlightGuard {
            busy:    Arc::clone(&self.busy),
            targets: targets.to_vec(),
        })
    }

    pub fn is_busy(&self, target: &str) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(target)
    }
}

/// Releases its targets on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    busy:    Arc<Mutex<HashSet<String>>>,
    targets: Vec<String>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        for t in &self.targets {
            busy.remove(t);
        }
    }
}
