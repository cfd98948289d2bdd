//! Network boundary
//!
//! Everything that leaves the process goes through a [`Fetcher`]. The engine
//! only depends on the trait, so hosts can plug in their own transport and
//! tests can script latency and outages.

mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpFetcher;

use crate::error::WardenResult;
use crate::request::{Request, Response};
use async_trait::async_trait;

/// Abstract network transport
///
/// A returned `Ok` carries whatever the server answered, including non-2xx
/// statuses. `Err` means the request never produced a response
/// (no connectivity, DNS failure, reset, transport timeout).
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request against the network
    async fn fetch(&self, request: &Request) -> WardenResult<Response>;

    /// Get the human-readable transport name for display
    fn fetcher_name(&self) -> &'static str;
}
