//! Application layer of `histview`.
//!
//! Builds a [`Session`] from the configuration and drives it:
//! - `watch`: render every panel on a timer, reload on config change
//! - `once`: a single pass over the panels
//! - `list`, `reset`, `reset_all`: one-shot commands

pub mod status_file;

pub use status_file::FileStatus;

use futures::future::join_all;
use hv_client::{Endpoints, HttpOptions, HttpTransport};
use hv_config::{ConfigWatcher, PanelConfig, PollConfig, ViewerConfig};
use hv_core::{LogStatus, Result, StatusSurface};
use hv_render::{FileSink, Renderer};
use hv_session::{ActiveDirectory, RenderOutcome, RenderRequest, Session, SessionOptions};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

// ── Wiring ────────────────────────────────────────────────────────────────────

/// Connect a session to the configured server, output directory and status
/// surface.  No request is sent yet.
pub fn build_session(config: &ViewerConfig) -> Result<Session> {
    let server = &config.server;
    let transport = HttpTransport::new(
        &server.base_url,
        HttpOptions {
            timeout: server.timeout_ms.map(Duration::from_millis),
            batch:   server.batch,
        },
    )?;

    let sink = FileSink::new(&config.output.dir)?;
    let status: Arc<dyn StatusSurface> = if config.output.status_file {
        Arc::new(FileStatus::new(&config.output.dir))
    } else {
        Arc::new(LogStatus)
    };

    Ok(Session::new(
        Arc::new(transport),
        Renderer::new(Arc::new(sink)),
        status,
        SessionOptions {
            endpoints:    Endpoints { compact: server.compact, compressed: server.compressed },
            batch:        server.batch,
            resolve_mode: server.resolve_mode,
        },
    ))
}

pub fn panel_request(panel: &PanelConfig) -> RenderRequest {
    RenderRequest {
        mode:       panel.mode,
        library:    panel.library,
        targets:    panel.targets.clone(),
        histograms: panel.histograms.clone(),
        recreate:   panel.recreate,
    }
}

/// Render all panels concurrently.  Returns how many were drawn; failures
/// have already been reported by the session.
pub async fn render_panels(session: &Session, panels: &[PanelConfig]) -> usize {
    let outcomes = join_all(panels.iter().map(|panel| {
        let request = panel_request(panel);
        async move { session.render(&request).await }
    }))
    .await;

    outcomes
        .iter()
        .zip(panels)
        .filter(|(outcome, panel)| match outcome {
            Ok(RenderOutcome::Rendered(_)) => true,
            Ok(other) => {
                debug!("Panel {:?}: {other:?}", panel.targets);
                false
            }
            Err(_) => false,
        })
        .count()
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Poll the server until Ctrl-C, re-reading `path` whenever it changes.
pub async fn watch(path: impl AsRef<Path>) -> Result<()> {
    let path: PathBuf = path.as_ref().to_path_buf();
    let mut config = hv_config::load(&path)?;
    let mut session = build_session(&config)?;
    let mut ticker = poll_timer(&config.poll);
    let (_watcher, mut reloads) = ConfigWatcher::spawn(&path);

    info!(
        "Polling {} every {} ms ({} panel(s))",
        config.server.base_url,
        config.poll.interval_ms,
        config.panels.len()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Spawned so a hung request only blocks its own targets; the
                // next tick's call for them is dropped by the session.
                let session = session.clone();
                let panels = config.panels.clone();
                tokio::spawn(async move {
                    render_panels(&session, &panels).await;
                });
            }
            Some(()) = reloads.recv() => {
                match reload(&path, &config) {
                    Ok((new, rebuilt)) => {
                        if let Some(s) = rebuilt {
                            session = s;
                        }
                        if new.poll != config.poll {
                            ticker = poll_timer(&new.poll);
                        }
                        info!("Config reloaded ({} panel(s))", new.panels.len());
                        config = new;
                    }
                    Err(e) => warn!("Config reload failed: {e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; stopping");
                break;
            }
        }
    }
    Ok(())
}

/// Load the changed config, and build a new session if the connection or
/// output settings moved.
fn reload(path: &Path, current: &ViewerConfig) -> Result<(ViewerConfig, Option<Session>)> {
    let new = hv_config::load(path)?;
    let session = if new.server != current.server || new.output != current.output {
        info!("Server or output settings changed; reconnecting");
        Some(build_session(&new)?)
    } else {
        None
    };
    Ok((new, session))
}

fn poll_timer(poll: &PollConfig) -> Interval {
    let mut ticker = time::interval(Duration::from_millis(poll.interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Render every panel once, waiting for directory discovery first.
pub async fn once(config: &ViewerConfig) -> Result<usize> {
    let session = build_session(config)?;
    session.resolve().await?;
    Ok(render_panels(&session, &config.panels).await)
}

/// Resolve the active directory and describe it.
pub async fn list(config: &ViewerConfig) -> Result<String> {
    let session = build_session(config)?;
    let dir = session.resolve().await?;
    Ok(describe(&dir))
}

/// Reset the named histograms.  Returns how many the server accepted.
pub async fn reset(config: &ViewerConfig, names: &[String]) -> Result<usize> {
    let session = build_session(config)?;
    session.resolve().await?;
    let mut done = 0;
    for name in names {
        if session.reset_histogram(name).await {
            done += 1;
        }
    }
    Ok(done)
}

pub async fn reset_all(config: &ViewerConfig) -> Result<usize> {
    let session = build_session(config)?;
    session.resolve().await?;
    Ok(session.reset_all().await)
}

/// One line per object: name, ROOT class, title.  Sub-directory entries are
/// listed as `<sub>/<name>`, the form panels can refer to them by.
pub fn describe(dir: &ActiveDirectory) -> String {
    let mut out = format!("{}\n", dir.path);
    let nested = dir.subdirectories.iter().flat_map(|sub| &sub.descriptors);
    for d in dir.descriptors.iter().chain(nested) {
        let _ = writeln!(out, "  {:<32} {:<24} {}", d.path, d.kind_tag, d.title);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hv_config::OutputConfig;
    use hv_core::{HistogramDescriptor, HistogramKind, HvError, Library, RenderMode};
    use hv_session::SubDirectory;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const LISTING: &str = r#"{"_name":"","_childs":[{"_name":"Files","_childs":[
        {"_name":"run.root","_kind":"ROOT.TFile","_childs":[
            {"_name":"h1","_kind":"ROOT.TH1D","_title":"ADC 0"},
            {"_name":"h2","_kind":"ROOT.TH1D","_title":"ADC 1"}
        ]}
    ]}]}"#;

    const H1: &str = r#"{"_typename":"TH1D","fName":"h1","fTitle":"ADC 0",
        "fXaxis":{"fNbins":2,"fXmin":0,"fXmax":2,"fTitle":""},
        "fArray":[0,4,6,0]}"#;

    /// Minimal THttpServer stand-in answering `GET <path>` from `routes`,
    /// 404 otherwise.  Returns the base URL.
    async fn serve(routes: &[(&str, &'static str)]) -> String {
        let routes: HashMap<String, &'static str> =
            routes.iter().map(|(p, b)| (format!("/{p}"), *b)).collect();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut sock, _)) = listener.accept().await else { break };
                let routes = routes.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let mut head = Vec::new();
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match sock.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&head);
                    let path = head.split_whitespace().nth(1).unwrap_or("").to_string();
                    let reply = match routes.get(&path) {
                        Some(body) => format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        ),
                        None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_string(),
                    };
                    let _ = sock.write_all(reply.as_bytes()).await;
                });
            }
        });
        format!("http://{addr}/")
    }

    fn config(base_url: String, dir: &Path) -> ViewerConfig {
        let mut cfg = ViewerConfig::default();
        cfg.server.base_url = base_url;
        cfg.server.batch = false;
        cfg.output = OutputConfig { dir: dir.to_path_buf(), status_file: true };
        cfg
    }

    #[test]
    fn panel_becomes_request() {
        let panel = PanelConfig {
            targets:    vec!["g".into()],
            histograms: vec!["h1".into(), "h2".into()],
            mode:       RenderMode::Overlay,
            library:    Library::Plotly,
            recreate:   true,
        };
        let request = panel_request(&panel);
        assert_eq!(request, RenderRequest::overlay("g", ["h1", "h2"]).with_library(Library::Plotly).recreating());
    }

    #[test]
    fn bad_server_url_fails_wiring() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config("::nope::".into(), dir.path());
        assert!(matches!(build_session(&cfg), Err(HvError::Config(_))));
    }

    #[test]
    fn describe_lists_nested_entries_by_path() {
        let desc = |path: &str, tag: &str, title: &str| HistogramDescriptor {
            name:     path.rsplit('/').next().unwrap_or(path).into(),
            path:     path.into(),
            title:    title.into(),
            kind_tag: tag.into(),
            kind:     HistogramKind::OneDimensional,
        };
        let dir = ActiveDirectory {
            path:           "Files/run.root".into(),
            descriptors:    vec![desc("h1", "ROOT.TH1D", "ADC 0")],
            subdirectories: vec![SubDirectory {
                name:        "tdc".into(),
                descriptors: vec![desc("tdc/t0", "ROOT.TH1F", "TDC 0")],
            }],
        };
        let text = describe(&dir);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Files/run.root");
        assert!(lines[1].trim_start().starts_with("h1 "));
        assert!(lines[1].ends_with("ADC 0"));
        assert!(lines[2].trim_start().starts_with("tdc/t0 "));
    }

    #[tokio::test]
    async fn once_writes_charts_and_status() {
        let base = serve(&[
            ("h.json", LISTING),
            ("Files/run.root/h1/root.json.gz?compact=3", H1),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(base, dir.path());
        cfg.panels = vec![PanelConfig::single("adc0", "h1"), PanelConfig::single("adc1", "h2")];

        // h2 has no payload on the server: one panel drawn, one failed.
        assert_eq!(once(&cfg).await.unwrap(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("adc0.csv")).unwrap(),
            "ADC value,ADC 0\n0.5,4\n1.5,6\n"
        );
        assert!(!dir.path().join("adc1.csv").exists());
        assert!(dir.path().join("status.json").exists());
    }

    #[tokio::test]
    async fn list_and_reset_against_server() {
        let base = serve(&[
            ("h.json", LISTING),
            ("Files/run.root/h1/exe.json?method=Reset", ""),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(base, dir.path());

        let text = list(&cfg).await.unwrap();
        assert!(text.starts_with("Files/run.root\n"));
        assert!(text.contains("ROOT.TH1D"));

        assert_eq!(reset(&cfg, &["h1".into(), "h2".into()]).await.unwrap(), 1);
        assert_eq!(reset_all(&cfg).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let cfg = config(format!("http://{addr}/"), dir.path());
        assert!(once(&cfg).await.unwrap_err().is_transport());
    }
}
