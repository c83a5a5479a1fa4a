//! Shaping and drawing of histogram data.
//!
//! - [`shape`]: payloads → bin tables and heatmap matrices
//! - [`library`]: charts → Dygraph CSV / Plotly JSON / JSROOT JSON
//! - [`slots`]: per-target create / update / replace decisions
//! - [`sink`]: where the encoded charts end up

pub mod chart;
pub mod library;
pub mod shape;
pub mod sink;
pub mod slots;

pub use chart::{Chart, ChartBody, ChartFamily};
pub use library::{encode, Format, Rendered};
pub use shape::{BinTable, Heatmap, Series};
pub use sink::{FileSink, MemorySink, RenderSink, SinkEvent};
pub use slots::{ChartSlots, DrawAction, Slot};

use hv_core::{HvError, Library, Result};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Draws charts into render targets, reusing each target's chart instance
/// when it can and destroying it when it can't.
pub struct Renderer {
    sink:  Arc<dyn RenderSink>,
    slots: Mutex<ChartSlots>,
}

impl Renderer {
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        Self { sink, slots: Mutex::new(ChartSlots::new()) }
    }

    /// Encode `chart` for `library` and draw it into `target`.
    pub fn draw(&self, target: &str, library: Library, recreate: bool, chart: &Chart) -> Result<DrawAction> {
        let rendered = encode(library, chart);
        let slot = Slot { family: chart.family(), format: rendered.format };

        let mut slots = self.slots.lock().map_err(|_| poisoned())?;
        let action = slots.plan(target, slot, library, recreate);
        debug!("{action:?} chart '{}' in '{target}'", chart.title);

        match action {
            DrawAction::Create => self.sink.create(target, &rendered)?,
            DrawAction::Update => self.sink.update(target, &rendered)?,
            DrawAction::Replace => {
                slots.forget(target);
                self.sink.destroy(target)?;
                self.sink.create(target, &rendered)?;
            }
        }
        slots.commit(target, slot);
        Ok(action)
    }

    /// Destroy the chart in `target`, if any.  Returns whether one existed.
    pub fn clear(&self, target: &str) -> Result<bool> {
        let mut slots = self.slots.lock().map_err(|_| poisoned())?;
        if slots.forget(target) {
            self.sink.destroy(target)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Family of the chart currently shown in `target`.
    pub fn live_family(&self, target: &str) -> Option<ChartFamily> {
        self.slots.lock().ok()?.family(target)
    }
}

fn poisoned() -> HvError {
    HvError::Render("chart slot registry poisoned".into())
}
