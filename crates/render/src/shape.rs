//! Reshaping histogram payloads into the tabular inputs plotting libraries
//! expect.

use hv_core::{HistogramPayload, HvError, Result};

/// Header used when the x axis has no title.
const DEFAULT_X_LABEL: &str = "ADC value";
/// Header used when a histogram has no title.
const DEFAULT_SERIES_LABEL: &str = "Number Entries";

/// One column of a [`BinTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label:  String,
    pub values: Vec<f64>,
}

/// Bin centers plus one value column per 1-D histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct BinTable {
    pub x_title: String,
    pub centers: Vec<f64>,
    pub series:  Vec<Series>,
}

impl BinTable {
    /// Table with a single column.
    pub fn from_histogram(label: &str, payload: &HistogramPayload) -> Result<Self> {
        Self::overlay([(label, payload)])
    }

    /// Table with one column per histogram.  Bin centers and the x title
    /// come from the first histogram; every other histogram must have the
    /// same number of bins.
    pub fn overlay<'a, I>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a HistogramPayload)>,
    {
        let mut items = items.into_iter();
        let Some((label, first)) = items.next() else {
            return Err(HvError::Render("nothing to tabulate".into()));
        };

        let values = first.visible_contents()?.to_vec();
        let mut table = Self {
            x_title: first.x_axis.title.clone(),
            centers: first.x_axis.bin_centers(),
            series:  vec![Series { label: label.to_string(), values }],
        };

        for (label, payload) in items {
            let values = payload.visible_contents()?;
            if values.len() != table.centers.len() {
                return Err(HvError::Render(format!(
                    "cannot overlay '{label}' ({} bins) on '{}' ({} bins)",
                    values.len(),
                    table.series[0].label,
                    table.centers.len()
                )));
            }
            table.series.push(Series { label: label.to_string(), values: values.to_vec() });
        }

        Ok(table)
    }

    /// CSV text: a header line, then one `center,value…` row per bin.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&csv_label(&self.x_title, DEFAULT_X_LABEL));
        for s in &self.series {
            out.push(',');
            out.push_str(&csv_label(&s.label, DEFAULT_SERIES_LABEL));
        }
        out.push('\n');

        for (row, center) in self.centers.iter().enumerate() {
            out.push_str(&center.to_string());
            for s in &self.series {
                out.push(',');
                out.push_str(&s.values[row].to_string());
            }
            out.push('\n');
        }
        out
    }
}

fn csv_label(label: &str, fallback: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        fallback.to_string()
    } else {
        label.replace([',', '\n', '\r'], " ")
    }
}

/// Row-major matrix of a 2-D histogram: `z[y][x]`, under/overflow dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    pub x_title:   String,
    pub y_title:   String,
    pub x_centers: Vec<f64>,
    pub y_centers: Vec<f64>,
    pub z:         Vec<Vec<f64>>,
}

impl Heatmap {
    pub fn from_histogram(payload: &HistogramPayload) -> Result<Self> {
        payload.check_2d()?;
        let y_axis = payload.y_axis()?;
        let (nx, ny) = (payload.x_axis.num_bins, y_axis.num_bins);

        let mut z = Vec::with_capacity(ny as usize);
        for y in 1..=ny {
            let row = (1..=nx)
                .map(|x| payload.value_2d(x, y))
                .collect::<Result<Vec<_>>>()?;
            z.push(row);
        }

        Ok(Self {
            x_title:   payload.x_axis.title.clone(),
            y_title:   y_axis.title.clone(),
            x_centers: payload.x_axis.bin_centers(),
            y_centers: y_axis.bin_centers(),
            z,
        })
    }
}
