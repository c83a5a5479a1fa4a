use crate::shape::{BinTable, Heatmap};
use serde_json::Value;

/// Shaped data for one render target.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub body:  ChartBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    /// Line/step chart of one or more 1-D histograms.
    Lines(BinTable),
    /// Color map of a 2-D histogram.
    Heatmap(Heatmap),
    /// ROOT object(s) handed to a library that draws them natively.
    Object { value: Value, option: String },
}

/// Which kind of chart instance a slot currently holds.  Switching family
/// means the old instance cannot be updated and has to be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFamily {
    Lines,
    Heatmap,
    Object,
}

impl Chart {
    pub fn lines(title: impl Into<String>, table: BinTable) -> Self {
        Self { title: title.into(), body: ChartBody::Lines(table) }
    }

    pub fn heatmap(title: impl Into<String>, map: Heatmap) -> Self {
        Self { title: title.into(), body: ChartBody::Heatmap(map) }
    }

    pub fn object(title: impl Into<String>, value: Value, option: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body:  ChartBody::Object { value, option: option.into() },
        }
    }

    pub fn family(&self) -> ChartFamily {
        match self.body {
            ChartBody::Lines(_)      => ChartFamily::Lines,
            ChartBody::Heatmap(_)    => ChartFamily::Heatmap,
            ChartBody::Object { .. } => ChartFamily::Object,
        }
    }
}
