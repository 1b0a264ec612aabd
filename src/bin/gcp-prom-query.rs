#[path = "gcp-prom-query/app.rs"]
mod app;
#[path = "gcp-prom-query/args.rs"]
mod args;
#[path = "gcp-prom-query/logging.rs"]
mod logging;

use std::process::ExitCode;

use clap::Parser;

use crate::args::CliArgs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    if args.version {
        app::print_version();
        return ExitCode::SUCCESS;
    }

    let _logger = match logging::init_logging(args.debug) {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("could not initialise logging: {err}");
            return ExitCode::FAILURE;
        }
    };

    match app::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
