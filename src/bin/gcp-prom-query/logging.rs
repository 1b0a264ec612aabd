use flexi_logger::{AdaptiveFormat, Logger, LoggerHandle};

/// Logs to stderr at `info`, or `debug` for this crate when requested. `RUST_LOG` wins when set.
pub fn init_logging(debug: bool) -> anyhow::Result<LoggerHandle> {
    let level = if debug {
        "info, gcp_prom_query=debug"
    } else {
        "info"
    };
    let handle = Logger::try_with_env_or_str(level)?
        .log_to_stderr()
        .adaptive_format_for_stderr(AdaptiveFormat::Opt)
        .start()?;
    Ok(handle)
}
