use hv_core::{
    check_shape, file_stem, HvError, Library, RenderMode, ResolveMode, Result, STATUS_STEM,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure parsed from `histview.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    /// Histogram server connection settings.
    pub server: ServerConfig,
    /// Refresh cadence of `histview watch`.
    pub poll: PollConfig,
    /// Where rendered charts and the status line are written.
    pub output: OutputConfig,
    /// Panels rendered on every poll.
    pub panels: Vec<PanelConfig>,
}

impl ViewerConfig {
    /// Check every panel's shape; the first bad panel wins.
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            return Err(HvError::Config("poll.interval_ms must be positive".into()));
        }
        for (i, panel) in self.panels.iter().enumerate() {
            panel
                .validate()
                .map_err(|e| HvError::Config(format!("panels[{i}]: {e}")))?;
        }
        self.check_output_names()
    }

    /// Every target owns `<output.dir>/<stem>.*`: two distinct targets must
    /// not share a stem, and none may take the status file's.
    fn check_output_names(&self) -> Result<()> {
        let mut owners: HashMap<String, &str> = HashMap::new();
        for (i, panel) in self.panels.iter().enumerate() {
            for target in &panel.targets {
                let stem = file_stem(target);
                if self.output.status_file && stem == STATUS_STEM {
                    return Err(HvError::Config(format!(
                        "panels[{i}]: target '{target}' would overwrite {STATUS_STEM}.json"
                    )));
                }
                match owners.get(&stem) {
                    Some(other) if *other != target.as_str() => {
                        return Err(HvError::Config(format!(
                            "panels[{i}]: targets '{other}' and '{target}' both write '{stem}.*'"
                        )));
                    }
                    _ => {
                        owners.insert(stem, target);
                    }
                }
            }
        }
        Ok(())
    }
}

/// THttpServer connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL the server publishes under, e.g. `http://daq01:9091/`.
    pub base_url: String,
    /// `compact` query parameter of `root.json` requests.
    pub compact: u8,
    /// Request the gzip-encoded `root.json.gz` variant.
    pub compressed: bool,
    /// Use `multi.json` to fetch several histograms in one request.
    pub batch: bool,
    /// Per-request timeout.  Unset means requests may hang indefinitely.
    pub timeout_ms: Option<u64>,
    /// Whether a render call waits for directory discovery.
    pub resolve_mode: ResolveMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url:     "http://localhost:9091/".to_string(),
            compact:      3,
            compressed:   true,
            batch:        true,
            timeout_ms:   None,
            resolve_mode: ResolveMode::Blocking,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 2_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one file per render target.
    pub dir: PathBuf,
    /// Also write `status.json` next to the charts.
    pub status_file: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir:         PathBuf::from("plots"),
            status_file: true,
        }
    }
}

/// One render request repeated on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Render target handles, e.g. `["graphdiv"]`.
    pub targets: Vec<String>,
    /// Histogram names relative to the active directory.
    pub histograms: Vec<String>,
    #[serde(default)]
    pub mode: RenderMode,
    #[serde(default)]
    pub library: Library,
    /// Throw the previous chart away instead of updating it in place.
    #[serde(default)]
    pub recreate: bool,
}

impl PanelConfig {
    pub fn single(target: impl Into<String>, histogram: impl Into<String>) -> Self {
        Self {
            targets:    vec![target.into()],
            histograms: vec![histogram.into()],
            mode:       RenderMode::Single,
            library:    Library::Dygraph,
            recreate:   false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_shape(self.mode, self.targets.len(), self.histograms.len())
    }
}
