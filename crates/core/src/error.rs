use thiserror::Error;

/// Top-level error type shared by every `hv-*` crate.
#[derive(Debug, Error)]
pub enum HvError {
    #[error("config error: {0}")]
    Config(String),

    /// The listing has no `Files` child directory holding histograms.
    #[error("no data-source directory with histograms found under 'Files'")]
    DirectoryNotFound,

    /// Non-200 response or network failure.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("histogram '{0}' not found in the active directory")]
    HistogramNotFound(String),

    #[error("histogram '{name}' has unsupported kind '{kind}'")]
    UnsupportedKind { name: String, kind: String },

    #[error("render error: {0}")]
    Render(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl HvError {
    /// `true` for errors that mean the server could not be reached or refused
    /// the request; these invalidate the cached directory.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<serde_json::Error> for HvError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type Result<T, E = HvError> = std::result::Result<T, E>;
