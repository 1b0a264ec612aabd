use anyhow::Context;
use clap::error::ErrorKind;
use clap::CommandFactory;

use gcp_prom_query::{print_instant, QueryConfig, QueryConfigBuilder};

use crate::args::{CliArgs, Commands};

const APP_NAME: &str = "gcp-prom-query";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const COMMIT: Option<&str> = option_env!("GCP_PROM_QUERY_COMMIT");
const BUILD_DATE: Option<&str> = option_env!("GCP_PROM_QUERY_BUILD_DATE");

pub fn print_version() {
    println!(
        "{APP_NAME} {VERSION}, commit {}, built {}",
        COMMIT.unwrap_or("unset"),
        BUILD_DATE.unwrap_or("unset")
    );
}

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let Some(command) = args.command else {
        CliArgs::command()
            .error(ErrorKind::MissingSubcommand, "a subcommand is required")
            .exit();
    };

    let mut builder = QueryConfig::builder()
        .prom_api(args.prom_api)
        .timeout_secs(args.timeout);
    if let Some(project) = args.gcp_project {
        builder = builder.gcp_project(project);
    }
    if let Some(token) = args.gcp_token {
        builder = builder.token(token);
    }

    match command {
        Commands::Instant { now, query } => {
            let config = resolve(builder.now(now))?;
            print_instant(&config, &query)
                .await
                .with_context(|| format!("instant query {query:?} failed"))?;
        }
    }
    Ok(())
}

fn resolve(builder: QueryConfigBuilder) -> anyhow::Result<QueryConfig> {
    let config = builder.build()?;
    log::debug!(
        "Resolved endpoint {} (timeout {:?}, evaluation time {})",
        config.endpoint(),
        config.timeout(),
        config.time().timestamp()
    );
    Ok(config)
}
