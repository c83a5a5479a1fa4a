use hv_core::{LogStatus, Status, StatusSurface, STATUS_STEM};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Status surface for a host page: logs every status and keeps the latest
/// one in `<dir>/status.json` as `{"text", "color", "at"}`.
#[derive(Debug, Clone)]
pub struct FileStatus {
    path: PathBuf,
}

impl FileStatus {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(format!("{STATUS_STEM}.json")) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, status: &Status) -> std::io::Result<()> {
        let body = serde_json::to_string(status)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)
    }
}

impl StatusSurface for FileStatus {
    fn report(&self, status: Status) {
        if let Err(e) = self.write(&status) {
            warn!("Cannot write '{}': {e}", self.path.display());
        }
        LogStatus.report(status);
    }
}
