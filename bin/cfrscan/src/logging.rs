use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the tracing subscriber. Logs go to stderr so stdout stays
/// reserved for command output.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
