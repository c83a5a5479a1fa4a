//! Mapping from render target handles to output file names.

/// File stem of the status line written next to the charts.
pub const STATUS_STEM: &str = "status";

/// Target handles are opaque; keep only characters safe in a file name.
///
/// Distinct handles may share a stem (`a/b` and `a_b`); configuration
/// rejects such pairs.
pub fn file_stem(target: &str) -> String {
    let stem: String = target
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect();
    match stem.trim_start_matches('.') {
        "" => "_".to_string(),
        s => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names_are_sanitised() {
        assert_eq!(file_stem("graphdiv21"), "graphdiv21");
        assert_eq!(file_stem("../etc/passwd"), "_etc_passwd");
        assert_eq!(file_stem("#plot 1"), "_plot_1");
        assert_eq!(file_stem(""), "_");
        assert_eq!(file_stem("a/b"), file_stem("a_b"));
    }
}
