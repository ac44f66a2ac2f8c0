//! Binary entry point for bluebubbles-mcp.
//!
//! This binary runs an MCP server that lets AI agents drive a
//! BlueBubbles messaging server.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use std::process::ExitCode;

use bluebubbles_mcp::api::ApiClient;
use bluebubbles_mcp::config::ServerConfig;
use bluebubbles_mcp::mcp::McpServer;
use bluebubbles_mcp::observability;
use clap::{Parser, Subcommand};

/// BlueBubbles MCP - iMessage tools for AI agents.
#[derive(Parser)]
#[command(name = "bluebubbles-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server over stdio.
    Serve,

    /// Check connectivity to the BlueBubbles server.
    Ping,
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    // Optional; deployments usually configure through the MCP host's env block.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    observability::init(cli.verbose);

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            eprintln!();
            eprintln!("Required environment variables:");
            eprintln!("  BLUEBUBBLES_URL       e.g. http://localhost:1234");
            eprintln!("  BLUEBUBBLES_PASSWORD  the server password");
            return ExitCode::FAILURE;
        }
    };

    let client = match ApiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create API client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Serve => cmd_serve(client).await,
        Commands::Ping => cmd_ping(client).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the MCP server over stdio until stdin closes.
async fn cmd_serve(client: ApiClient) -> bluebubbles_mcp::Result<()> {
    tracing::info!("Starting MCP server on stdio");
    McpServer::new(client).run().await
}

/// Pings the upstream server and prints its version.
async fn cmd_ping(client: ApiClient) -> bluebubbles_mcp::Result<()> {
    client.ping().await?;
    let info = client.server_info().await?;
    let version = info
        .data
        .as_ref()
        .and_then(|d| d.get("server_version"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown");
    println!("BlueBubbles server is reachable (version {version})");
    Ok(())
}
