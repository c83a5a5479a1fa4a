use crate::transport::Transport;
use async_trait::async_trait;
use hv_core::{HvError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Connection options for [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// Abort requests that take longer than this.  `None` = wait forever.
    pub timeout: Option<Duration>,
    /// Advertise `multi.json` support to the pipeline.
    pub batch: bool,
}

/// THttpServer client over HTTP.
///
/// Every request path is resolved against the base URL, so a server
/// published under a sub-path (`http://host:9091/rootana/`) works unchanged.
pub struct HttpTransport {
    client: Client,
    base:   Url,
    batch:  bool,
}

impl HttpTransport {
    /// Create a client for `base_url`.  A missing trailing `/` is added so
    /// relative paths land below the base rather than beside it.
    pub fn new(base_url: &str, options: HttpOptions) -> Result<Self> {
        let mut normalised = base_url.trim().to_string();
        if !normalised.ends_with('/') {
            normalised.push('/');
        }
        let base = Url::parse(&normalised)
            .map_err(|e| HvError::Config(format!("invalid server URL '{base_url}': {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| HvError::Transport(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { client, base, batch: options.batch })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of a request path.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HvError::Config(format!("bad request path '{path}': {e}")))
    }

    async fn finish(&self, url: &Url, resp: reqwest::Response) -> Result<String> {
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(HvError::Transport(format!("{url} returned {status}")));
        }
        resp.text()
            .await
            .map_err(|e| HvError::Transport(format!("reading {url}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<String> {
        let url = self.url(path)?;
        debug!("GET {url}");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| HvError::Transport(format!("network error for {url}: {e}")))?;
        self.finish(&url, resp).await
    }

    async fn post(&self, path: &str, body: String) -> Result<String> {
        let url = self.url(path)?;
        debug!("POST {url} ({} bytes)", body.len());
        let resp = self
            .client
            .post(url.clone())
            .body(body)
            .send()
            .await
            .map_err(|e| HvError::Transport(format!("network error for {url}: {e}")))?;
        self.finish(&url, resp).await
    }

    fn supports_batch(&self) -> bool {
        self.batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one request with a fixed status line and body, returning
    /// the base URL and a handle resolving to the raw request head.
    async fn one_shot(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut head = Vec::new();
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });
        (format!("http://{addr}/rootana"), handle)
    }

    #[test]
    fn base_gets_trailing_slash() {
        let t = HttpTransport::new("http://daq01:9091/rootana", HttpOptions::default()).unwrap();
        assert_eq!(t.base().as_str(), "http://daq01:9091/rootana/");
        assert_eq!(
            t.url("h.json").unwrap().as_str(),
            "http://daq01:9091/rootana/h.json"
        );
        assert_eq!(
            t.url("/multi.json?number=2").unwrap().as_str(),
            "http://daq01:9091/rootana/multi.json?number=2"
        );
    }

    #[test]
    fn invalid_base_is_config_error() {
        assert!(matches!(
            HttpTransport::new("not a url", HttpOptions::default()),
            Err(HvError::Config(_))
        ));
    }

    #[tokio::test]
    async fn get_returns_body_on_200() {
        let (base, server) = one_shot("200 OK", "{\"_name\":\"\"}").await;
        let t = HttpTransport::new(&base, HttpOptions::default()).unwrap();
        let body = t.get("h.json").await.unwrap();
        assert_eq!(body, "{\"_name\":\"\"}");
        let head = server.await.unwrap();
        assert!(head.starts_with("GET /rootana/h.json "), "{head}");
    }

    #[tokio::test]
    async fn non_200_is_transport_error() {
        let (base, _server) = one_shot("404 Not Found", "").await;
        let t = HttpTransport::new(&base, HttpOptions::default()).unwrap();
        let err = t.get("Files/x/root.json").await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("404"), "{err}");
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let t = HttpTransport::new(&format!("http://{addr}/"), HttpOptions::default()).unwrap();
        assert!(t.get("h.json").await.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn timeout_turns_a_hang_into_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and then say nothing.
        let _server = tokio::spawn(async move {
            let (_sock, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let options = HttpOptions { timeout: Some(Duration::from_millis(100)), batch: false };
        let t = HttpTransport::new(&format!("http://{addr}/"), options).unwrap();
        assert!(t.get("h.json").await.unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn post_sends_body() {
        let (base, server) = one_shot("200 OK", "[]").await;
        let t = HttpTransport::new(&base, HttpOptions { batch: true, ..Default::default() }).unwrap();
        assert!(t.supports_batch());
        assert_eq!(t.post("multi.json?number=0", String::new()).await.unwrap(), "[]");
        let head = server.await.unwrap();
        assert!(head.starts_with("POST /rootana/multi.json?number=0 "), "{head}");
    }
}
