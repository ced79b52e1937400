use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Filtering follows `RUST_LOG` and defaults to
/// `info`; output goes to stderr so stdout only carries the conversation.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
