use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use singularity_core::time::LocalZone;
use singularity_mcp_runtime::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, RuntimeConfig};
use singularity_mcp_runtime::{McpCommands, run as run_mcp};

#[derive(Parser)]
#[command(
    name = "singularity-mcp",
    version,
    about = "Singularity MCP server: the SingularityApp task manager as MCP tools over stdio"
)]
struct Cli {
    /// API base URL
    #[arg(long, env = "SINGULARITY_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Bearer token (from https://me.singularity-app.com)
    #[arg(long, env = "SINGULARITY_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Local timezone as whole hours from UTC, e.g. 3 or -5 (default: host clock)
    #[arg(
        long,
        env = "SINGULARITY_TIMEZONE_OFFSET",
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-12..=14),
        conflicts_with = "timezone"
    )]
    timezone_offset: Option<i32>,

    /// Local timezone as an IANA name, e.g. Europe/Moscow (default: host clock)
    #[arg(long, env = "SINGULARITY_TIMEZONE")]
    timezone: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "SINGULARITY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<McpCommands>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "singularity_mcp=info,singularity_mcp_runtime=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let zone = match LocalZone::from_settings(cli.timezone_offset, cli.timezone.as_deref()) {
        Ok(zone) => zone,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let config = RuntimeConfig {
        api_url: cli.api_url,
        token: cli.token,
        timeout: Duration::from_secs(cli.timeout_secs),
        zone,
    };

    let code = run_mcp(config, cli.command.unwrap_or(McpCommands::Serve)).await;
    std::process::exit(code);
}
