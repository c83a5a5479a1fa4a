//! Remote `Reset` of histogram contents.

use crate::directory::ActiveDirectory;
use crate::session::Session;
use hv_core::Status;
use tracing::warn;

impl Session {
    /// Ask the server to zero one histogram.  Returns whether it accepted.
    ///
    /// Names are looked up like render requests; a name the listing does not
    /// know is sent as given.
    pub async fn reset_histogram(&self, name: &str) -> bool {
        let Ok(dir) = self.resolved_directory().await else {
            return false;
        };
        let path = dir.find(name).map_or(name, |d| d.path.as_str());
        self.reset_path(&dir, path).await
    }

    /// Reset every object listed in the active directory, one after the
    /// other.  Individual failures are skipped; returns how many succeeded.
    pub async fn reset_all(&self) -> usize {
        let Ok(dir) = self.resolved_directory().await else {
            return 0;
        };

        let mut done = 0;
        for desc in &dir.descriptors {
            if self.reset_path(&dir, &desc.path).await {
                done += 1;
            }
        }
        done
    }

    async fn reset_path(&self, dir: &ActiveDirectory, path: &str) -> bool {
        let request = self.options().endpoints.reset(&dir.path, path);
        match self.transport().get(&request).await {
            Ok(_) => {
                self.report(Status::ok(format!("Reset histogram {path}")));
                true
            }
            Err(e) => {
                warn!("Reset of '{path}' failed: {e}");
                self.report(Status::error(format!("Failed to reset histogram {path}")));
                false
            }
        }
    }
}
