use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SPELLGATE_LOG";

/// Install the stderr subscriber; stdout is left to the report.
///
/// `SPELLGATE_LOG` takes precedence; otherwise `warn`, or `debug` when verbose.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
