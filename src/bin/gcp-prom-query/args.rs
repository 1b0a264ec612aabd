use clap::{Parser, Subcommand};
use gcp_prom_query::config::{DEFAULT_PROM_API, DEFAULT_TIMEOUT_SECS, GCP_TOKEN_ENV};

#[derive(Parser, Debug)]
#[command(
    name = "gcp-prom-query",
    about = "Runs query on the gcp prometheus api",
    disable_version_flag = true
)]
pub struct CliArgs {
    #[arg(long, short = 'v', global = true, help = "Show version")]
    pub version: bool,
    #[arg(long, short = 'd', global = true, help = "Debug level logging")]
    pub debug: bool,
    #[arg(
        long,
        short = 't',
        global = true,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Timeout in seconds for the query"
    )]
    pub timeout: u64,
    #[arg(
        long = "prom-api",
        short = 'u',
        global = true,
        default_value = DEFAULT_PROM_API,
        help = "URL to API server. Used when gcp-project is not provided."
    )]
    pub prom_api: String,
    #[arg(
        long = "gcp-project",
        short = 'p',
        global = true,
        help = "Name of the GCP project. If not given, uses 'prom-api'"
    )]
    pub gcp_project: Option<String>,
    #[arg(
        long = "gcp-token",
        short = 'a',
        global = true,
        env = GCP_TOKEN_ENV,
        hide_env_values = true,
        help = "Access token for the GCP API. Required if project is given."
    )]
    pub gcp_token: Option<String>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Instant query")]
    Instant {
        #[arg(
            long,
            default_value_t = 0,
            help = "Time to run instant query as Unix epoch time"
        )]
        now: i64,
        #[arg(help = "PromQL query")]
        query: String,
    },
}
