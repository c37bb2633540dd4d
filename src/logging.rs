use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout carries only the console dialogue.
/// Verbosity comes from `RUST_LOG`, defaulting to warnings.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
