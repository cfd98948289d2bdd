//! CLI command implementations

pub mod config;
pub mod control;
pub mod fetch;
pub mod lifecycle;
pub mod notify;
pub mod revalidate;

pub use config::execute as config;
pub use control::{clear, message, stats};
pub use fetch::execute as fetch;
pub use lifecycle::{activate, install};
pub use notify::execute as push;
pub use revalidate::execute as revalidate;
