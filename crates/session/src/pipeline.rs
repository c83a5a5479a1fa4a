//! Fetch histograms, shape them, and draw them into render targets.

use crate::directory::ActiveDirectory;
use crate::session::Session;
use hv_core::{
    check_shape, HistogramDescriptor, HistogramKind, HistogramPayload, HvError, Library,
    RenderMode, Result, Status,
};
use hv_render::{BinTable, Chart, Heatmap};
use serde_json::Value;
use tracing::debug;

/// JSROOT draw option for a single histogram (`colz` = color map for 2-D).
const JSROOT_OPTION: &str = "colz";
/// JSROOT draw option for superimposed histograms.
const JSROOT_OVERLAY_OPTION: &str = "same";
/// Title of an overlay chart holding more than one histogram.
const OVERLAY_TITLE: &str = "multiple histograms";

/// One render call: which histograms go into which targets, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub mode:       RenderMode,
    pub library:    Library,
    pub targets:    Vec<String>,
    pub histograms: Vec<String>,
    /// Replace existing charts instead of updating them.
    pub recreate:   bool,
}

impl RenderRequest {
    pub fn single(target: impl Into<String>, histogram: impl Into<String>) -> Self {
        Self {
            mode:       RenderMode::Single,
            library:    Library::default(),
            targets:    vec![target.into()],
            histograms: vec![histogram.into()],
            recreate:   false,
        }
    }

    pub fn overlay<S: Into<String>>(target: impl Into<String>, histograms: impl IntoIterator<Item = S>) -> Self {
        Self {
            mode:       RenderMode::Overlay,
            library:    Library::default(),
            targets:    vec![target.into()],
            histograms: histograms.into_iter().map(Into::into).collect(),
            recreate:   false,
        }
    }

    /// One histogram per target, pairwise.
    pub fn multi<S: Into<String>>(pairs: impl IntoIterator<Item = (S, S)>) -> Self {
        let (targets, histograms): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(t, h)| (t.into(), h.into()))
            .unzip();
        Self {
            mode: RenderMode::Multi,
            library: Library::default(),
            targets,
            histograms,
            recreate: false,
        }
    }

    #[must_use]
    pub fn with_library(mut self, library: Library) -> Self {
        self.library = library;
        self
    }

    #[must_use]
    pub fn recreating(mut self) -> Self {
        self.recreate = true;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_shape(self.mode, self.targets.len(), self.histograms.len())
    }
}

/// How a render call ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// This many targets were drawn.
    Rendered(usize),
    /// A previous call for one of the targets is still outstanding.
    Dropped,
    /// Directory discovery was started in the background; try again later.
    Deferred,
    /// Nothing sensible to draw (2-D histogram in an overlay).
    Skipped,
}

impl Session {
    /// Run one render call.  The outcome is also reported on the status
    /// surface; errors abort only this call.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderOutcome> {
        if let Err(e) = request.validate() {
            self.report(Status::error(e.to_string()));
            return Err(e);
        }

        let Some(_guard) = self.inflight().try_acquire(&request.targets) else {
            debug!("Render into {:?} dropped: request in flight", request.targets);
            return Ok(RenderOutcome::Dropped);
        };

        let dir = match self.directory().await? {
            Some(dir) => dir,
            None => {
                self.report(Status::warning("Looking for histograms on the server..."));
                return Ok(RenderOutcome::Deferred);
            }
        };

        match self.render_in(&dir, request).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if e.is_transport() {
                    self.invalidate();
                }
                self.report(Status::error(failure_text(&e)));
                Err(e)
            }
        }
    }

    async fn render_in(&self, dir: &ActiveDirectory, request: &RenderRequest) -> Result<RenderOutcome> {
        let descriptors = request
            .histograms
            .iter()
            .map(|name| {
                dir.find(name)
                    .cloned()
                    .ok_or_else(|| HvError::HistogramNotFound(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        for (name, desc) in request.histograms.iter().zip(&descriptors) {
            if desc.kind == HistogramKind::Unsupported {
                return Err(HvError::UnsupportedKind {
                    name: name.clone(),
                    kind: desc.kind_tag.clone(),
                });
            }
        }

        if request.mode == RenderMode::Overlay
            && descriptors.iter().any(|d| d.kind == HistogramKind::TwoDimensional)
        {
            self.renderer().clear(&request.targets[0])?;
            self.report(Status::warning(
                "Can't meaningfully overlay a 2-D histogram; not plotting.",
            ));
            return Ok(RenderOutcome::Skipped);
        }

        let paths: Vec<&str> = descriptors.iter().map(|d| d.path.as_str()).collect();
        let payloads = self.fetch(dir, &paths).await?;

        // Shape everything before drawing anything, so a bad payload leaves
        // every target as it was.
        let charts = match request.mode {
            RenderMode::Overlay => vec![(
                &request.targets[0],
                overlay_chart(request.library, &descriptors, &payloads)?,
            )],
            RenderMode::Single | RenderMode::Multi => request
                .targets
                .iter()
                .zip(descriptors.iter().zip(&payloads))
                .map(|(target, (desc, payload))| {
                    Ok((target, chart(request.library, desc, payload)?))
                })
                .collect::<Result<Vec<_>>>()?,
        };

        for (target, chart) in &charts {
            self.renderer()
                .draw(target, request.library, request.recreate, chart)?;
        }

        self.report(Status::ok("Histogram data correctly read"));
        Ok(RenderOutcome::Rendered(charts.len()))
    }

    /// Fetch the payloads at `paths` (relative to the active directory), in
    /// order: one `multi.json` request when batching is possible, one request
    /// per histogram otherwise.
    async fn fetch(&self, dir: &ActiveDirectory, names: &[&str]) -> Result<Vec<HistogramPayload>> {
        let endpoints = self.options().endpoints;

        if names.len() > 1 && self.options().batch && self.transport().supports_batch() {
            let (path, body) = endpoints.multi(&dir.path, names);
            let text = self.transport().post(&path, body).await?;
            let items: Vec<Value> = serde_json::from_str(&text)?;
            if items.len() != names.len() {
                return Err(HvError::Parse(format!(
                    "batched reply holds {} objects, expected {}",
                    items.len(),
                    names.len()
                )));
            }
            return items.into_iter().map(HistogramPayload::from_value).collect();
        }

        let mut payloads = Vec::with_capacity(names.len());
        for name in names {
            let text = self
                .transport()
                .get(&endpoints.histogram(&dir.path, name))
                .await?;
            payloads.push(HistogramPayload::from_json(&text)?);
        }
        Ok(payloads)
    }
}

fn display_title(desc: &HistogramDescriptor) -> &str {
    if desc.title.is_empty() {
        &desc.name
    } else {
        &desc.title
    }
}

/// Chart of a single histogram.
fn chart(library: Library, desc: &HistogramDescriptor, payload: &HistogramPayload) -> Result<Chart> {
    let title = display_title(desc);
    if library == Library::Jsroot {
        return Ok(Chart::object(title, payload.raw.clone(), JSROOT_OPTION));
    }
    match desc.kind {
        HistogramKind::OneDimensional => {
            Ok(Chart::lines(title, BinTable::from_histogram(title, payload)?))
        }
        HistogramKind::TwoDimensional => Ok(Chart::heatmap(title, Heatmap::from_histogram(payload)?)),
        HistogramKind::Unsupported => Err(HvError::UnsupportedKind {
            name: desc.name.clone(),
            kind: desc.kind_tag.clone(),
        }),
    }
}

/// Chart superimposing several 1-D histograms.
fn overlay_chart(library: Library, descriptors: &[HistogramDescriptor], payloads: &[HistogramPayload]) -> Result<Chart> {
    let title = match descriptors {
        [only] => display_title(only),
        _ => OVERLAY_TITLE,
    };
    if library == Library::Jsroot {
        let objects = payloads.iter().map(|p| p.raw.clone()).collect();
        return Ok(Chart::object(title, Value::Array(objects), JSROOT_OVERLAY_OPTION));
    }
    let table = BinTable::overlay(
        descriptors
            .iter()
            .map(display_title)
            .zip(payloads.iter()),
    )?;
    Ok(Chart::lines(title, table))
}

fn failure_text(e: &HvError) -> String {
    match e {
        HvError::Transport(_) => {
            format!("Couldn't get histogram data: {e}. Did the histogram server die?")
        }
        HvError::HistogramNotFound(name) => {
            format!("Failed to find histogram '{name}' in the active directory")
        }
        _ => e.to_string(),
    }
}
