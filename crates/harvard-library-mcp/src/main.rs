//! Harvard Library MCP Server - Entry Point
//!
//! Provides both stdio (for desktop MCP clients) and HTTP transports.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use harvard_library_mcp::{CatalogClient, config::Config, server::McpServer, tools::ToolContext};

#[derive(Parser, Debug)]
#[command(name = "harvard-library-mcp")]
#[command(about = "MCP server for the Harvard Library catalog")]
#[command(version)]
struct Cli {
    /// Catalog API root
    #[arg(long, env = "HARVARD_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Sustained requests per second against the catalog API
    #[arg(long, env = "RATE_LIMIT_REQUESTS_PER_SECOND")]
    rate: Option<u32>,

    /// Requests allowed immediately after idle
    #[arg(long, env = "RATE_LIMIT_BURST_SIZE")]
    burst: Option<u32>,

    /// Per-attempt request timeout in seconds
    #[arg(long, env = "HARVARD_API_TIMEOUT")]
    timeout: Option<u64>,

    /// Deadline in seconds for each tool call, retries included
    #[arg(long, env = "TOOL_DEADLINE")]
    deadline: Option<u64>,

    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio", env = "MCP_TRANSPORT")]
    transport: Transport,

    /// HTTP bind address (only used with --transport http)
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: std::net::Ipv4Addr,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// HTTP with JSON-RPC and REST routes
    Http,
}

/// Logs go to stderr; stdout belongs to the stdio transport.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(url) = &cli.api_base_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(rate) = cli.rate {
        config.requests_per_second = rate;
    }
    if let Some(burst) = cli.burst {
        config.burst_size = burst;
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting Harvard Library MCP server"
    );

    let config = build_config(&cli)?;
    tracing::info!(
        base_url = %config.base_url,
        rps = config.requests_per_second,
        burst = config.burst_size,
        "Catalog client configured"
    );

    let client = CatalogClient::new(config)?;
    let mut ctx = ToolContext::new(std::sync::Arc::new(client));
    if let Some(secs) = cli.deadline {
        ctx = ctx.with_deadline(Duration::from_secs(secs));
    }
    let server = McpServer::with_context(ctx);

    match cli.transport {
        Transport::Stdio => {
            tracing::info!("Running in stdio mode");
            server.run_stdio().await?;
        }
        Transport::Http => {
            tracing::info!(host = %cli.host, port = cli.port, "Running in HTTP mode");
            server.run_http(cli.host.octets(), cli.port).await?;
        }
    }

    Ok(())
}
