//! Request paths of the THttpServer JSON API.

/// Listing of every registered object.
pub const LISTING: &str = "h.json";

/// Builds the per-histogram request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// `compact` level of the JSON encoding (0 = pretty, 3 = no spaces).
    pub compact: u8,
    /// Ask for the gzip-encoded `root.json.gz`.
    pub compressed: bool,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self { compact: 3, compressed: true }
    }
}

impl Endpoints {
    /// `<dir>/<name>/root.json[.gz]?compact=<n>`
    pub fn histogram(&self, dir: &str, name: &str) -> String {
        let ext = if self.compressed { "root.json.gz" } else { "root.json" };
        format!("{}/{ext}?compact={}", object(dir, name), self.compact)
    }

    /// `multi.json?number=<k>` together with its newline-separated body.
    pub fn multi<S: AsRef<str>>(&self, dir: &str, names: &[S]) -> (String, String) {
        let body = names
            .iter()
            .map(|n| format!("{}/root.json\n", object(dir, n.as_ref())))
            .collect();
        (format!("multi.json?number={}", names.len()), body)
    }

    /// `<dir>/<name>/exe.json?method=Reset`
    pub fn reset(&self, dir: &str, name: &str) -> String {
        format!("{}/exe.json?method=Reset", object(dir, name))
    }
}

fn object(dir: &str, name: &str) -> String {
    let dir = dir.trim_matches('/');
    let name = name.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
