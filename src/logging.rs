use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; stdout carries only the short result lines.
///
/// `RUST_LOG` wins when set, otherwise `--verbose` turns on debug output for
/// this crate.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "static_site_deployer=debug,warn"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
