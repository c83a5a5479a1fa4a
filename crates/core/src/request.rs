use serde::{Deserialize, Serialize};

/// How a render call lays its histograms out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One histogram into one target.
    #[default]
    Single,
    /// Several 1-D histograms sharing one target and one x axis.
    Overlay,
    /// One histogram per target, fetched together.
    Multi,
}

/// Plotting library whose input format the output follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Library {
    #[default]
    Dygraph,
    Plotly,
    Jsroot,
}

/// Whether a render call waits for directory discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Resolve in place, then continue with the same call.
    #[default]
    Blocking,
    /// Start resolution in the background and skip this call.
    Deferred,
}

/// Check that `targets` and `histograms` counts fit `mode`: single takes one
/// of each, overlay one target and any number of histograms, multi one
/// histogram per target.
pub fn check_shape(mode: RenderMode, targets: usize, histograms: usize) -> crate::Result<()> {
    let ok = match mode {
        RenderMode::Single  => targets == 1 && histograms == 1,
        RenderMode::Overlay => targets == 1 && histograms >= 1,
        RenderMode::Multi   => targets >= 1 && targets == histograms,
    };
    if ok {
        Ok(())
    } else {
        Err(crate::HvError::Config(format!(
            "{mode:?} mode cannot take {targets} target(s) and {histograms} histogram(s)"
        )))
    }
}
