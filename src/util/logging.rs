// feedsniff - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets the filter to debug)
//   - Config file: [logging] level = "debug"
//
// Output: stderr, so stdout stays clean for reports.
// The sniffer and dispatcher never log; only the app, platform and CLI
// layers (and parsers at trace level) emit events.

use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = resolve_filter(
        std::env::var("RUST_LOG").ok().as_deref(),
        debug_flag,
        config_level,
    );

    // try_init: a second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&filter))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .try_init();

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        filter = %filter,
        "Logging initialised"
    );
}

/// Pick the filter directive string according to the priority order above.
fn resolve_filter(env: Option<&str>, debug_flag: bool, config_level: Option<&str>) -> String {
    if let Some(directive) = env.filter(|d| !d.trim().is_empty()) {
        directive.to_string()
    } else if debug_flag {
        "debug".to_string()
    } else if let Some(level) = config_level {
        level.to_string()
    } else {
        super::constants::DEFAULT_LOG_LEVEL.to_string()
    }
}
