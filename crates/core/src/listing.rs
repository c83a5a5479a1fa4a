use serde::Deserialize;

/// Classification of a listing entry, decided once when the listing is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A folder whose children should be searched (`ROOT.TDirectoryFile` etc).
    Directory,
    Hist1D,
    Hist2D,
    /// Anything else the server lists (trees, canvases, streamer info…).
    Other,
}

impl NodeKind {
    /// Classify a THttpServer `_kind` string.
    ///
    /// Entries without a recognised ROOT class that still carry children are
    /// treated as folders, which is how the server lists its own top-level
    /// containers (`Files`, `Canvases`, …).
    pub fn classify(tag: &str, has_children: bool) -> Self {
        if tag.contains("ROOT.TH1") {
            Self::Hist1D
        } else if tag.contains("ROOT.TH2") {
            Self::Hist2D
        } else if matches!(
            tag,
            "ROOT.TDirectoryFile" | "ROOT.TDirectory" | "ROOT.TFolder" | "ROOT.TFile"
        ) {
            Self::Directory
        } else if has_children {
            Self::Directory
        } else {
            Self::Other
        }
    }
}

/// What the pipeline knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramKind {
    OneDimensional,
    TwoDimensional,
    Unsupported,
}

impl From<NodeKind> for HistogramKind {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Hist1D => Self::OneDimensional,
            NodeKind::Hist2D => Self::TwoDimensional,
            NodeKind::Directory | NodeKind::Other => Self::Unsupported,
        }
    }
}

/// One entry of the server's `h.json` listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNode")]
pub struct DirectoryNode {
    pub name:     String,
    pub title:    String,
    /// The `_kind` string exactly as the server sent it.
    pub kind_tag: String,
    pub kind:     NodeKind,
    pub children: Vec<DirectoryNode>,
}

#[derive(Deserialize)]
struct RawNode {
    #[serde(rename = "_name", default)]
    name: String,
    #[serde(rename = "_title", default)]
    title: String,
    #[serde(rename = "_kind", default)]
    kind: String,
    #[serde(rename = "_childs", default)]
    childs: Vec<DirectoryNode>,
}

impl From<RawNode> for DirectoryNode {
    fn from(raw: RawNode) -> Self {
        let kind = NodeKind::classify(&raw.kind, !raw.childs.is_empty());
        Self {
            name:     raw.name,
            title:    raw.title,
            kind_tag: raw.kind,
            kind,
            children: raw.childs,
        }
    }
}

impl DirectoryNode {
    /// Parse a listing document.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        serde_json::from_str(raw).map_err(Into::into)
    }

    /// First direct child called `name`.
    pub fn child(&self, name: &str) -> Option<&DirectoryNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_histogram(&self) -> bool {
        matches!(self.kind, NodeKind::Hist1D | NodeKind::Hist2D)
    }
}

/// Cached summary of a listed object, used to classify a histogram before
/// its payload is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramDescriptor {
    pub name:     String,
    /// Server path relative to the active directory: `name`, or
    /// `<sub>/<name>` for an entry one sub-directory down.
    pub path:     String,
    pub title:    String,
    pub kind_tag: String,
    pub kind:     HistogramKind,
}

impl HistogramDescriptor {
    /// Descriptor of `node`, listed inside the sub-directory `parent`.
    pub fn nested(parent: &str, node: &DirectoryNode) -> Self {
        Self {
            path: format!("{parent}/{}", node.name),
            ..Self::from(node)
        }
    }
}

impl From<&DirectoryNode> for HistogramDescriptor {
    fn from(node: &DirectoryNode) -> Self {
        Self {
            name:     node.name.clone(),
            path:     node.name.clone(),
            title:    node.title.clone(),
            kind_tag: node.kind_tag.clone(),
            kind:     node.kind.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "_name": "",
        "_childs": [
            {"_name": "Files", "_childs": [
                {"_name": "output00042.root", "_kind": "ROOT.TFile", "_childs": [
                    {"_name": "adc0", "_kind": "ROOT.TH1D", "_title": "ADC channel 0"},
                    {"_name": "tdc_vs_adc", "_kind": "ROOT.TH2F", "_title": "TDC vs ADC"},
                    {"_name": "tree", "_kind": "ROOT.TTree"}
                ]}
            ]}
        ]
    }"#;

    #[test]
    fn parses_nested_listing() {
        let root = DirectoryNode::from_json(LISTING).unwrap();
        let files = root.child("Files").unwrap();
        assert!(files.is_directory());

        let file = &files.children[0];
        assert_eq!(file.name, "output00042.root");
        assert_eq!(file.children.len(), 3);
        assert_eq!(file.children[0].kind, NodeKind::Hist1D);
        assert_eq!(file.children[1].kind, NodeKind::Hist2D);
        assert_eq!(file.children[2].kind, NodeKind::Other);
    }

    #[test]
    fn classify_kinds() {
        assert_eq!(NodeKind::classify("ROOT.TH1F", false), NodeKind::Hist1D);
        assert_eq!(NodeKind::classify("ROOT.TH2D", false), NodeKind::Hist2D);
        assert_eq!(NodeKind::classify("ROOT.TDirectoryFile", false), NodeKind::Directory);
        assert_eq!(NodeKind::classify("ROOT.TCanvas", false), NodeKind::Other);
        assert_eq!(NodeKind::classify("", true), NodeKind::Directory);
    }

    #[test]
    fn descriptor_carries_kind() {
        let node = DirectoryNode {
            name:     "h".into(),
            title:    "t".into(),
            kind_tag: "ROOT.TProfile".into(),
            kind:     NodeKind::Other,
            children: Vec::new(),
        };
        let desc = HistogramDescriptor::from(&node);
        assert_eq!(desc.kind, HistogramKind::Unsupported);
        assert_eq!(desc.kind_tag, "ROOT.TProfile");
        assert_eq!(desc.path, "h");

        let nested = HistogramDescriptor::nested("sub", &node);
        assert_eq!(nested.name, "h");
        assert_eq!(nested.path, "sub/h");
    }

    #[test]
    fn malformed_listing_is_parse_error() {
        let err = DirectoryNode::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::HvError::Parse(_)));
    }
}
