//! Encoders producing each plotting library's input format.

use crate::chart::{Chart, ChartBody};
use crate::shape::{BinTable, Heatmap};
use hv_core::Library;
use serde_json::{json, Value};

/// Text encoding of a rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv  => "csv",
            Self::Json => "json",
        }
    }
}

/// Library input ready to hand to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub format: Format,
    pub text:   String,
}

impl Rendered {
    fn json(value: Value) -> Self {
        Self { format: Format::Json, text: value.to_string() }
    }
}

/// Encode `chart` for `library`.
///
/// Dygraph only draws line charts, so its heatmaps are emitted as Plotly
/// traces, the same hand-off the Dygraph pages do for 2-D histograms.
/// Native ROOT objects are always emitted in the JSROOT envelope.
pub fn encode(library: Library, chart: &Chart) -> Rendered {
    match (&chart.body, library) {
        (ChartBody::Lines(table), Library::Dygraph) => Rendered {
            format: Format::Csv,
            text:   table.to_csv(),
        },
        (ChartBody::Lines(table), _) => Rendered::json(plotly_lines(&chart.title, table)),
        (ChartBody::Heatmap(map), _) => Rendered::json(plotly_heatmap(&chart.title, map)),
        (ChartBody::Object { value, option }, _) => Rendered::json(json!({
            "title":  chart.title,
            "object": value,
            "option": option,
        })),
    }
}

fn plotly_lines(title: &str, table: &BinTable) -> Value {
    let data: Vec<Value> = table
        .series
        .iter()
        .map(|s| {
            json!({
                "x":    table.centers,
                "y":    s.values,
                "name": s.label,
                "type": "scatter",
                "mode": "lines",
                "line": { "shape": "hvh" },
            })
        })
        .collect();

    json!({
        "data": data,
        "layout": {
            "title": title,
            "xaxis": { "title": table.x_title },
            "showlegend": table.series.len() > 1,
        },
    })
}

fn plotly_heatmap(title: &str, map: &Heatmap) -> Value {
    json!({
        "data": [{
            "z":    map.z,
            "x":    map.x_centers,
            "y":    map.y_centers,
            "type": "heatmap",
        }],
        "layout": {
            "title": title,
            "xaxis": { "title": map.x_title },
            "yaxis": { "title": map.y_title },
            "showlegend": false,
        },
    })
}
