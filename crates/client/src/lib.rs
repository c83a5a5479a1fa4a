//! Transport to a ROOT THttpServer: the [`Transport`] seam, its reqwest
//! implementation and the request paths of the JSON API.

pub mod endpoints;
pub mod http;
pub mod transport;

pub use endpoints::{Endpoints, LISTING};
pub use http::{HttpOptions, HttpTransport};
pub use transport::Transport;
