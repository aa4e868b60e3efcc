/// Initializes structured logging for the whole process.
///
/// Uses `tracing_subscriber::fmt` with environment-based filtering, so
/// verbosity is controlled through `RUST_LOG`:
/// - `RUST_LOG=info` — lifecycle and order events
/// - `RUST_LOG=debug` — every tick, store and poll
/// - `RUST_LOG=unicorn_factory=debug` — debug for this crate only
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
