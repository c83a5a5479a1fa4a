//! Shared data model for `histview`: listing nodes, histogram payloads,
//! status reporting and the error type.

pub mod error;
pub mod histogram;
pub mod listing;
pub mod request;
pub mod status;
pub mod target;

pub use error::{HvError, Result};
pub use histogram::{flat_index, AxisMetadata, HistogramPayload};
pub use listing::{DirectoryNode, HistogramDescriptor, HistogramKind, NodeKind};
pub use request::{check_shape, Library, RenderMode, ResolveMode};
pub use status::{LogStatus, SharedStatus, Status, StatusLevel, StatusSurface};
pub use target::{file_stem, STATUS_STEM};
