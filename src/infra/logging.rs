use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Env var consulted before `RUST_LOG`
pub const LOG_ENV: &str = "PLAB_LOG";

/// Directive for `-v` count, `--quiet` wins
pub fn default_directive(
    verbose: u8,
    quiet: bool,
) -> &'static str
{
    if quiet
    {
        return "error";
    }

    match verbose
    {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber; later calls are no-ops.
pub fn init(
    verbose: u8,
    quiet: bool,
)
{
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
        .with_target(verbose > 1)
        .try_init();
}
