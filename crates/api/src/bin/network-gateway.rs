//! Network gateway binary entry point
//!
//! Loads configuration, builds the network registry and serves the HTTP API.
//! Also offers a thin client mode against a running gateway.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use gateway_api::GatewayServer;
use gateway_common::SystemConfig;
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "network-gateway")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP gateway for multi-agent networks")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "gateway.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "GATEWAY_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate configuration
    ValidateConfig,
    /// List networks on a running gateway (client mode)
    List {
        #[arg(long, default_value = "http://localhost:4111")]
        server_url: String,
    },
    /// Send one message to a network on a running gateway (client mode)
    Generate {
        network_id: String,
        message: String,

        /// JSON object sent as `runtimeContext`
        #[arg(long)]
        runtime_context: Option<String>,

        #[arg(long, default_value = "http://localhost:4111")]
        server_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List { server_url }) => {
            init_client_tracing(cli.log_level.as_deref())?;
            list_via_http(&server_url).await
        }
        Some(Commands::Generate {
            network_id,
            message,
            runtime_context,
            server_url,
        }) => {
            init_client_tracing(cli.log_level.as_deref())?;
            generate_via_http(&server_url, &network_id, &message, runtime_context.as_deref()).await
        }
        Some(Commands::ValidateConfig) => {
            let config = SystemConfig::load_config(&cli.config)?;
            println!("✓ Configuration is valid");
            println!("  Listening address: {}", config.server);
            for network in &config.networks {
                println!(
                    "  - {} ({} agents, routing via {})",
                    network.resolved_id(),
                    network.agents.len(),
                    network.routing_model
                );
            }
            Ok(())
        }
        Some(Commands::Serve { host, port }) => serve(&cli.config, cli.log_level, host, port).await,
        None => serve(&cli.config, cli.log_level, None, None).await,
    }
}

async fn serve(
    config_path: &str,
    log_level: Option<String>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = SystemConfig::load_config(config_path)?;
    if let Some(level) = log_level {
        config.telemetry.log_level = level;
    }
    gateway_common::init_tracing(&config.telemetry)?;

    info!("Network gateway v{} starting", env!("CARGO_PKG_VERSION"));
    for network in &config.networks {
        info!(
            "  - {} ({} agents): {}",
            network.resolved_id(),
            network.agents.len(),
            network.routing_model
        );
    }

    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    let result = match GatewayServer::new(config) {
        Ok(server) => server.run().await,
        Err(e) => {
            error!("Failed to start gateway: {:#}", e);
            Err(e)
        }
    };
    gateway_common::shutdown_tracer();
    result
}

fn init_client_tracing(level: Option<&str>) -> Result<()> {
    gateway_common::init_tracing_with_level(level.unwrap_or("warn"))?;
    Ok(())
}

async fn list_via_http(server_url: &str) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/api/networks", server_url.trim_end_matches('/')))
        .send()
        .await?;

    let body = read_json(response).await?;
    let networks = body.as_array().cloned().unwrap_or_default();
    for network in networks {
        println!(
            "{}\t{}\t{} agents",
            network["id"].as_str().unwrap_or_default(),
            network["name"].as_str().unwrap_or_default(),
            network["agents"].as_array().map(Vec::len).unwrap_or(0)
        );
    }
    Ok(())
}

async fn generate_via_http(
    server_url: &str,
    network_id: &str,
    message: &str,
    runtime_context: Option<&str>,
) -> Result<()> {
    info!("Generating via gateway: {}", server_url);

    let mut request = json!({ "messages": message });
    if let Some(raw) = runtime_context {
        let context: Value = serde_json::from_str(raw)?;
        if !context.is_object() {
            return Err(anyhow!("--runtime-context must be a JSON object"));
        }
        request["runtimeContext"] = context;
    }

    let client = reqwest::Client::new();
    let response = client
        .post(format!(
            "{}/api/networks/{}/generate",
            server_url.trim_end_matches('/'),
            network_id
        ))
        .json(&request)
        .send()
        .await?;

    let body = read_json(response).await?;
    println!("{}", body["text"].as_str().unwrap_or_default());
    Ok(())
}

async fn read_json(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await?;
    if status.is_success() {
        Ok(body)
    } else {
        let message = body["error"].as_str().unwrap_or("unknown error").to_string();
        error!("Gateway returned {}: {}", status, message);
        Err(anyhow!("Gateway error ({}): {}", status, message))
    }
}
