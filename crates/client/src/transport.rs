use async_trait::async_trait;
use hv_core::Result;

/// Request/response channel to the histogram server.
///
/// Paths are relative to the server's base URL and may carry a query string,
/// e.g. `Files/run42.root/adc0/root.json.gz?compact=3`.  Any response other
/// than `200 OK` is an [`hv_core::HvError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// `GET` a path and return the response body.
    async fn get(&self, path: &str) -> Result<String>;

    /// `POST` a text body to a path and return the response body.
    async fn post(&self, path: &str, body: String) -> Result<String>;

    /// Whether the server accepts `multi.json` batched queries.
    fn supports_batch(&self) -> bool {
        false
    }
}
