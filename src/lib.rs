//! Warden - offline caching and interception engine
//!
//! Sits between an installable web application and the network. Requests
//! are classified, routed to a fetch strategy and served from versioned
//! cache partitions, the network, or synthesized fallback content.

pub mod classify;
pub mod cli;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod lifecycle;
pub mod network;
pub mod notify;
pub mod request;
pub mod revalidate;
pub mod router;
pub mod store;
pub mod strategy;

pub use engine::Warden;
pub use error::{WardenError, WardenResult};
pub use router::{Interception, InterceptionRouter};
