//! Common test utilities for envirocar-client integration tests

#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;

use envirocar_client::Config;
use wiremock::MockServer;

/// Configuration pointing at a mock server, anonymous, four concurrent fetches
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    Config {
        base_url: format!("{}/api/stable/", server.uri()),
        pool_size: 4,
        ..Default::default()
    }
}
