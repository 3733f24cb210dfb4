use crate::cli::LogFormatArg;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`.
pub fn init(format: LogFormatArg) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match format {
        LogFormatArg::Json => builder.json().try_init(),
        LogFormatArg::Pretty => builder.pretty().try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
