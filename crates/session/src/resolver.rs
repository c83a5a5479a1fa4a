//! Discovery of the directory that holds live histograms.

use crate::directory::ActiveDirectory;
use hv_client::{Transport, LISTING};
use hv_core::{DirectoryNode, HvError, Result};

/// Top-level listing entry the server publishes open files under.
pub const FILES: &str = "Files";

/// Whether `node` holds a histogram directly or one sub-directory down.
pub fn holds_histograms(node: &DirectoryNode) -> bool {
    node.children.iter().any(|child| {
        child.is_histogram()
            || (child.is_directory() && child.children.iter().any(DirectoryNode::is_histogram))
    })
}

/// Pick the active directory out of a parsed listing.
///
/// Only the first qualifying child of `Files` is used; later data sources
/// are ignored.
pub fn locate(root: &DirectoryNode) -> Result<ActiveDirectory> {
    let files = root.child(FILES).ok_or(HvError::DirectoryNotFound)?;
    files
        .children
        .iter()
        .find(|dir| holds_histograms(dir))
        .map(|dir| ActiveDirectory::from_node(FILES, dir))
        .ok_or(HvError::DirectoryNotFound)
}

/// Fetch the listing and locate the active directory.
pub async fn fetch_active_directory(transport: &dyn Transport) -> Result<ActiveDirectory> {
    let body = transport.get(LISTING).await?;
    let root = DirectoryNode::from_json(&body)?;
    locate(&root)
}
