use hv_core::{DirectoryNode, HistogramDescriptor, HistogramKind};

/// The data-source directory histograms are read from, as cached after
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDirectory {
    /// Server path of the directory, e.g. `Files/output00042.root`.
    pub path:           String,
    /// Every object listed directly in the directory.
    pub descriptors:    Vec<HistogramDescriptor>,
    /// Objects one sub-directory level down.
    pub subdirectories: Vec<SubDirectory>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDirectory {
    pub name:        String,
    pub descriptors: Vec<HistogramDescriptor>,
}

impl ActiveDirectory {
    /// Snapshot `node`, which lives under `parent` on the server.
    pub fn from_node(parent: &str, node: &DirectoryNode) -> Self {
        let subdirectories = node
            .children
            .iter()
            .filter(|c| c.is_directory())
            .map(|dir| SubDirectory {
                name:        dir.name.clone(),
                descriptors: dir
                    .children
                    .iter()
                    .map(|child| HistogramDescriptor::nested(&dir.name, child))
                    .collect(),
            })
            .collect();

        Self {
            path: format!("{}/{}", parent.trim_end_matches('/'), node.name),
            descriptors: node.children.iter().map(HistogramDescriptor::from).collect(),
            subdirectories,
        }
    }

    /// Look a histogram up by name.
    ///
    /// An exact match among the directory's own entries wins.  Otherwise
    /// only the last path segment is compared: first inside the
    /// sub-directory named by the preceding segment, then against the
    /// directory's own entries, then inside any sub-directory.
    pub fn find(&self, name: &str) -> Option<&HistogramDescriptor> {
        if let Some(d) = self.descriptors.iter().find(|d| d.name == name) {
            return Some(d);
        }

        let mut segments = name.rsplit('/');
        let leaf = segments.next().unwrap_or(name);
        let parent = segments.next();

        let in_named_subdir = parent.and_then(|p| {
            self.subdirectories
                .iter()
                .filter(|s| s.name == p)
                .find_map(|s| s.descriptors.iter().find(|d| d.name == leaf))
        });

        in_named_subdir
            .or_else(|| self.descriptors.iter().find(|d| d.name == leaf))
            .or_else(|| {
                self.subdirectories
                    .iter()
                    .find_map(|s| s.descriptors.iter().find(|d| d.name == leaf))
            })
    }

    /// Drawable histograms listed directly in the directory.
    pub fn histograms(&self) -> impl Iterator<Item = &HistogramDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.kind != HistogramKind::Unsupported)
    }
}
