//! Discussion Trees command-line front end
//!
//! Library half of the `dtree` binary: configuration loading, logging setup,
//! text rendering and the sample discussion.

#![warn(unreachable_pub)]

pub mod config;
pub mod demo;
pub mod logging;
pub mod render;

pub use config::{AppConfig, ConfigError, LogConfig, LogFormat, UnknownLogFormat};
pub use demo::{run_demo, DemoOutput};
pub use logging::init_logging;
pub use render::{render_node, render_summary, render_tree};

use dtree_core::Operation;

/// Parse a JSON array of operation records
///
/// # Errors
/// Malformed JSON or records missing required fields.
pub fn parse_operations(text: &str) -> Result<Vec<Operation>, serde_json::Error> {
    serde_json::from_str(text)
}
