use std::sync::Once;

static INIT: Once = Once::new();

/// Install a test subscriber once per binary; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}
