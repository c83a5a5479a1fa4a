//! Client session against a ROOT THttpServer.
//!
//! A [`Session`] owns the cached active directory and the per-target
//! in-flight flags.  Rendering lives in [`pipeline`], histogram resets in
//! [`reset`] and directory discovery in [`resolver`].

pub mod directory;
pub mod inflight;
pub mod pipeline;
pub mod reset;
pub mod resolver;
pub mod session;

#[cfg(test)]
mod testing;

pub use directory::{ActiveDirectory, SubDirectory};
pub use inflight::{InFlight, InFlightGuard};
pub use pipeline::{RenderOutcome, RenderRequest};
pub use resolver::{fetch_active_directory, holds_histograms, locate, FILES};
pub use session::{Session, SessionOptions};
