//! Tracing subscriber setup for binaries and tests embedding the runtime.
use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (for example
/// `"info,creature::combat=debug"`) is used. Installing twice is a no-op.
pub fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
