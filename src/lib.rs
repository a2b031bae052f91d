//! End-to-end UI test suite for the Sauce Demo storefront.
//!
//! Chrome is driven directly over the DevTools Protocol. Page objects wrap
//! each storefront page, and a local replica of the storefront lets the suite
//! run without network access.

pub mod browser;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod pages;
pub mod replica;
pub mod utils;
pub mod visual;

pub use error::{Result, SuiteError};
pub use harness::Harness;

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber (`RUST_LOG`, default `info`). Safe to call from
/// every test; only the first call takes effect.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
