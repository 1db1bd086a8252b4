//! PSI Core - Backend logic for the Whippet PSI pipeline driver
//!
//! This crate contains the configuration model, activity logging, external
//! tool execution and the pipeline steps. It has no CLI dependencies.

pub mod command;
pub mod config;
pub mod decompress;
pub mod logging;
pub mod models;
pub mod orchestrator;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
