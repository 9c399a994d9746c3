// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted container probe and catalog fixtures for integration tests.

use std::path::Path;
use std::sync::Once;

use shipwright::config::{Catalog, Settings};

// Each test binary only uses some of these helpers, so allow dead_code.
#[allow(dead_code)]
pub mod fake_probe;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("shipwright=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Parse `yaml` and resolve settings rooted at `base`, with an instant health wait.
#[allow(dead_code)]
pub fn catalog_in(base: &Path, yaml: &str) -> (Catalog, Settings) {
    let catalog = Catalog::from_yaml(yaml).unwrap();
    let mut settings = catalog.settings(base).unwrap();
    settings.retry.delay = std::time::Duration::ZERO;
    (catalog, settings)
}
