use crate::{HvError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Binning of one histogram axis (ROOT `TAxis`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AxisMetadata {
    #[serde(rename = "fXmin")]
    pub min: f64,
    #[serde(rename = "fXmax")]
    pub max: f64,
    #[serde(rename = "fNbins")]
    pub num_bins: u32,
    #[serde(rename = "fTitle", default)]
    pub title: String,
}

impl AxisMetadata {
    pub fn new(min: f64, max: f64, num_bins: u32) -> Self {
        Self { min, max, num_bins, title: String::new() }
    }

    /// Width of a single bin; `NaN`-free only for `num_bins > 0`.
    #[must_use]
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / f64::from(self.num_bins)
    }

    /// Center of visible bin `i` (0-based, underflow excluded).
    #[must_use]
    pub fn bin_center(&self, i: u32) -> f64 {
        let width = self.bin_width();
        self.min + f64::from(i) * width + width / 2.0
    }

    /// Centers of all visible bins, in order.
    pub fn bin_centers(&self) -> Vec<f64> {
        (0..self.num_bins).map(|i| self.bin_center(i)).collect()
    }

    /// Number of stored cells along this axis, including under/overflow.
    #[must_use]
    pub fn stored_bins(&self) -> usize {
        (self.num_bins as usize).saturating_add(2)
    }

    fn check(&self, axis: &str) -> Result<()> {
        if self.num_bins == 0 {
            return Err(HvError::Parse(format!("{axis} axis has no bins")));
        }
        if !(self.max > self.min) {
            return Err(HvError::Parse(format!(
                "{axis} axis range [{}, {}] is empty",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Flat `fArray` index of the 1-based bin `(x, y)` of a 2-D histogram.
#[must_use]
pub fn flat_index(x: u32, y: u32, num_bins_x: u32) -> usize {
    y as usize * (num_bins_x as usize + 2) + x as usize
}

/// Histogram object as returned by `root.json` (TH1*/TH2*).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistogramPayload {
    #[serde(rename = "_typename", default)]
    pub typename: String,
    #[serde(rename = "fName", default)]
    pub name: String,
    #[serde(rename = "fTitle", default)]
    pub title: String,
    #[serde(rename = "fXaxis")]
    pub x_axis: AxisMetadata,
    #[serde(rename = "fYaxis", default)]
    pub y_axis: Option<AxisMetadata>,
    #[serde(rename = "fArray")]
    pub contents: Vec<f64>,
    /// The object as received, for libraries that draw ROOT objects natively.
    #[serde(skip)]
    pub raw: Value,
}

impl HistogramPayload {
    /// Decode a payload from an already-parsed JSON value, keeping the value.
    pub fn from_value(raw: Value) -> Result<Self> {
        let mut payload: Self = serde_json::from_value(raw.clone())?;
        payload.raw = raw;
        Ok(payload)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Contents of the visible 1-D bins (`fArray[1..=n]`).
    pub fn visible_contents(&self) -> Result<&[f64]> {
        self.x_axis.check("x")?;
        let n = self.x_axis.num_bins as usize;
        self.contents.get(1..=n).ok_or_else(|| {
            HvError::Parse(format!(
                "histogram '{}' has {} cells, expected at least {}",
                self.name,
                self.contents.len(),
                n + 1
            ))
        })
    }

    /// The y axis of a 2-D payload.
    pub fn y_axis(&self) -> Result<&AxisMetadata> {
        self.y_axis
            .as_ref()
            .ok_or_else(|| HvError::Parse(format!("histogram '{}' has no y axis", self.name)))
    }

    /// Content of the 1-based 2-D bin `(x, y)`.
    pub fn value_2d(&self, x: u32, y: u32) -> Result<f64> {
        let index = flat_index(x, y, self.x_axis.num_bins);
        self.contents.get(index).copied().ok_or_else(|| {
            HvError::Parse(format!(
                "histogram '{}' has no cell {index} for bin ({x}, {y})",
                self.name
            ))
        })
    }

    /// Validate that the array is large enough for both axes.
    pub fn check_2d(&self) -> Result<()> {
        self.x_axis.check("x")?;
        let y = self.y_axis()?;
        y.check("y")?;
        let needed = self
            .x_axis
            .stored_bins()
            .checked_mul(y.stored_bins())
            .ok_or_else(|| {
                HvError::Parse(format!("histogram '{}' has too many bins", self.name))
            })?;
        if self.contents.len() < needed {
            return Err(HvError::Parse(format!(
                "histogram '{}' has {} cells, expected {needed}",
                self.name,
                self.contents.len()
            )));
        }
        Ok(())
    }
}
