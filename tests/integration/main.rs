//! Integration tests for Algo-Harvest
//!
//! These tests use wiremock to stand in for the profile sites and run the real
//! reqwest transport end-to-end.

mod harvest_tests;
mod transport_tests;

use algo_harvest::config::{parse_config, Config};

/// Builds a config from TOML text, panicking on invalid input
pub fn config_from(toml: &str) -> Config {
    parse_config(toml).expect("test config should be valid")
}
