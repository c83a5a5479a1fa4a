//! In-memory server stand-in and fixtures shared by the unit tests.

use crate::session::{Session, SessionOptions};
use async_trait::async_trait;
use hv_client::Transport;
use hv_core::{HvError, Result, SharedStatus};
use hv_render::{MemorySink, Renderer};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const DIR: &str = "Files/run.root";

/// `Files/run.root` holding a 1-D, a 2-D, a tree and one sub-directory.
pub const LISTING_JSON: &str = r#"{"_name":"","_childs":[
    {"_name":"Files","_kind":"ROOT.TFolder","_childs":[
        {"_name":"run.root","_kind":"ROOT.TFile","_childs":[
            {"_name":"h1","_kind":"ROOT.TH1D","_title":"ADC 0"},
            {"_name":"h2","_kind":"ROOT.TH2D","_title":"Hit map"},
            {"_name":"tree","_kind":"ROOT.TTree"},
            {"_name":"sub","_kind":"ROOT.TDirectoryFile","_childs":[
                {"_name":"h3","_kind":"ROOT.TH1F","_title":"TDC 3"}
            ]}
        ]}
    ]}
]}"#;

#[derive(Clone)]
enum Route {
    Body(String),
    Fail,
    Hang,
}

/// Canned replies keyed by request path.  Unknown paths answer 404.
#[derive(Clone, Default)]
pub struct FakeTransport {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    log:    Arc<Mutex<Vec<(&'static str, String, String)>>>,
    batch:  bool,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, body: &str) -> Self {
        self.add(path, body);
        self
    }

    pub fn batching(mut self) -> Self {
        self.batch = true;
        self
    }

    pub fn add(&self, path: &str, body: &str) {
        self.set(path, Route::Body(body.to_string()));
    }

    pub fn fail(&self, path: &str) {
        self.set(path, Route::Fail);
    }

    /// Requests to `path` never complete.
    pub fn hang(&self, path: &str) {
        self.set(path, Route::Hang);
    }

    fn set(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }

    /// Every requested path, in order.
    pub fn paths(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(_, p, _)| p.clone()).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|(m, _, _)| *m == method).count()
    }

    /// Bodies of every `POST`, in order.
    pub fn posted(&self) -> Vec<String> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _, _)| *m == "POST")
            .map(|(_, _, body)| body.clone())
            .collect()
    }

    async fn answer(&self, method: &'static str, path: &str, body: String) -> Result<String> {
        self.log.lock().unwrap().push((method, path.to_string(), body));
        let route = self.routes.lock().unwrap().get(path).cloned();
        match route {
            Some(Route::Body(body)) => Ok(body),
            Some(Route::Fail) => Err(HvError::Transport(format!("{path}: connection reset"))),
            Some(Route::Hang) => std::future::pending::<Result<String>>().await,
            None => Err(HvError::Transport(format!("{path} returned 404 Not Found"))),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str) -> Result<String> {
        self.answer("GET", path, String::new()).await
    }

    async fn post(&self, path: &str, body: String) -> Result<String> {
        self.answer("POST", path, body).await
    }

    fn supports_batch(&self) -> bool {
        self.batch
    }
}

/// `root.json` of a TH1 with the given visible contents over `[0, n)`.
pub fn th1(name: &str, values: &[f64]) -> String {
    let mut cells = vec![0.0];
    cells.extend_from_slice(values);
    cells.push(0.0);
    serde_json::json!({
        "_typename": "TH1D",
        "fName": name,
        "fTitle": name,
        "fXaxis": {"fNbins": values.len(), "fXmin": 0.0, "fXmax": values.len() as f64, "fTitle": ""},
        "fArray": cells,
    })
    .to_string()
}

/// `root.json` of a 2x2 TH2 over `[0, 2) x [0, 2)`; `(x, y)` holds `10*x + y`.
pub fn th2(name: &str) -> String {
    let (nx, ny) = (2u32, 2u32);
    let mut cells = vec![0.0; ((nx + 2) * (ny + 2)) as usize];
    for y in 1..=ny {
        for x in 1..=nx {
            cells[hv_core::flat_index(x, y, nx)] = f64::from(10 * x + y);
        }
    }
    serde_json::json!({
        "_typename": "TH2D",
        "fName": name,
        "fTitle": name,
        "fXaxis": {"fNbins": nx, "fXmin": 0.0, "fXmax": 2.0},
        "fYaxis": {"fNbins": ny, "fXmin": 0.0, "fXmax": 2.0},
        "fArray": cells,
    })
    .to_string()
}

pub fn histogram_path(name: &str) -> String {
    hv_client::Endpoints::default().histogram(DIR, name)
}

pub fn fixture(transport: FakeTransport) -> (Session, Arc<MemorySink>, SharedStatus) {
    fixture_with(transport, SessionOptions { batch: true, ..Default::default() })
}

pub fn fixture_with(
    transport: FakeTransport,
    options: SessionOptions,
) -> (Session, Arc<MemorySink>, SharedStatus) {
    let sink = Arc::new(MemorySink::new());
    let status = SharedStatus::new();
    let session = Session::new(
        Arc::new(transport),
        Renderer::new(sink.clone()),
        Arc::new(status.clone()),
        options,
    );
    (session, sink, status)
}
