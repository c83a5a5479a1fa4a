use crate::library::{Format, Rendered};
use hv_core::{file_stem, HvError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Destination that owns the chart instances of every render target.
///
/// This is the plotting library's create / update / destroy surface; the
/// [`crate::Renderer`] decides which call each draw needs.
pub trait RenderSink: Send + Sync {
    fn create(&self, target: &str, chart: &Rendered) -> Result<()>;
    fn update(&self, target: &str, chart: &Rendered) -> Result<()>;
    fn destroy(&self, target: &str) -> Result<()>;
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Writes `<dir>/<target>.csv` or `<dir>/<target>.json` for a host page to
/// poll.  Files are replaced atomically so readers never see half a chart.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Create the sink, making `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output path of `target` in `format`.
    pub fn path_for(&self, target: &str, format: Format) -> PathBuf {
        self.dir.join(format!("{}.{}", file_stem(target), format.extension()))
    }

    fn write(&self, target: &str, chart: &Rendered) -> Result<()> {
        let path = self.path_for(target, chart.format);
        let tmp = path.with_extension(format!("{}.tmp", chart.format.extension()));
        std::fs::write(&tmp, &chart.text)?;
        std::fs::rename(&tmp, &path)?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl RenderSink for FileSink {
    fn create(&self, target: &str, chart: &Rendered) -> Result<()> {
        self.write(target, chart)
    }

    fn update(&self, target: &str, chart: &Rendered) -> Result<()> {
        self.write(target, chart)
    }

    fn destroy(&self, target: &str) -> Result<()> {
        for format in [Format::Csv, Format::Json] {
            match std::fs::remove_file(self.path_for(target, format)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

// ── Memory ────────────────────────────────────────────────────────────────────

/// One call received by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Created(String),
    Updated(String),
    Destroyed(String),
}

/// Keeps the latest chart of every target in memory, plus a call log.
#[derive(Debug, Default)]
pub struct MemorySink {
    charts: Mutex<HashMap<String, Rendered>>,
    events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self, target: &str) -> Option<Rendered> {
        self.charts.lock().ok()?.get(target).cloned()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn store(&self, target: &str, chart: Option<&Rendered>, event: SinkEvent) -> Result<()> {
        let mut charts = self.charts.lock().map_err(|_| poisoned())?;
        match chart {
            Some(c) => charts.insert(target.to_string(), c.clone()),
            None    => charts.remove(target),
        };
        self.events.lock().map_err(|_| poisoned())?.push(event);
        Ok(())
    }
}

fn poisoned() -> HvError {
    HvError::Render("memory sink lock poisoned".into())
}

impl RenderSink for MemorySink {
    fn create(&self, target: &str, chart: &Rendered) -> Result<()> {
        self.store(target, Some(chart), SinkEvent::Created(target.to_string()))
    }

    fn update(&self, target: &str, chart: &Rendered) -> Result<()> {
        self.store(target, Some(chart), SinkEvent::Updated(target.to_string()))
    }

    fn destroy(&self, target: &str) -> Result<()> {
        self.store(target, None, SinkEvent::Destroyed(target.to_string()))
    }
}
