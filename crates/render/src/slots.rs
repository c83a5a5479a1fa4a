use crate::chart::ChartFamily;
use crate::library::Format;
use hv_core::Library;
use std::collections::HashMap;

/// What has to happen to a target's chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawAction {
    /// Nothing drawn yet; create a chart.
    Create,
    /// Feed new data to the existing chart.
    Update,
    /// Destroy the existing chart and create a new one.
    Replace,
}

/// What a target currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub family: ChartFamily,
    pub format: Format,
}

/// Tracks which targets hold a live chart, and of which kind.
#[derive(Debug, Default)]
pub struct ChartSlots {
    live: HashMap<String, Slot>,
}

impl ChartSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide how to draw `next` into `target`.
    ///
    /// A change of family or output format cannot be applied in place.
    /// Plotly has no cheap in-place data swap, so its charts are always
    /// re-plotted.
    pub fn plan(&self, target: &str, next: Slot, library: Library, recreate: bool) -> DrawAction {
        match self.live.get(target) {
            None => DrawAction::Create,
            Some(prev) if *prev != next || recreate || library == Library::Plotly => {
                DrawAction::Replace
            }
            Some(_) => DrawAction::Update,
        }
    }

    pub fn commit(&mut self, target: &str, slot: Slot) {
        self.live.insert(target.to_string(), slot);
    }

    /// Forget a target's chart; `true` if one was live.
    pub fn forget(&mut self, target: &str) -> bool {
        self.live.remove(target).is_some()
    }

    pub fn family(&self, target: &str) -> Option<ChartFamily> {
        self.live.get(target).map(|slot| slot.family)
    }
}
