use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use auth_gateway::GatewayConfig;
use auth_identity::{IdentityConfig, InMemoryPrincipalStore};
use clap::Parser;
use colored::Colorize;
use gatehouse_server::{bootstrap_admin, build_gateway, create_app, BootstrapAdmin};
use logger_redacted::{init_tracing, LoggerConfig};
use tracing::info;

/// Gatehouse authentication gateway
#[derive(Parser, Debug)]
#[command(name = "gatehouse-server")]
#[command(about = "Token-based authentication gateway HTTP server")]
struct Args {
    /// Server bind address
    #[arg(long, env = "GATEHOUSE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "GATEHOUSE_PORT", default_value = "8080")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON log lines
    #[arg(long, env = "GATEHOUSE_JSON_LOGS")]
    json_logs: bool,

    /// Log emails, addresses and tokens verbatim (local debugging only)
    #[arg(long)]
    no_redaction: bool,

    /// Email of an admin account to create at startup
    #[arg(long, env = "GATEHOUSE_ADMIN_EMAIL", requires = "admin_password")]
    admin_email: Option<String>,

    /// Password for the startup admin account
    #[arg(long, env = "GATEHOUSE_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    init_tracing(
        &LoggerConfig::default()
            .with_level(format!("gatehouse_server={level},auth_gateway={level},auth_identity={level},tower_http=info"))
            .with_json(args.json_logs)
            .with_redaction(!args.no_redaction),
    )?;

    if !args.json_logs {
        print_startup_banner();
    }
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Gatehouse");

    let identity = IdentityConfig::from_env().map_err(|err| {
        error_common::report("startup", &err);
        tracing::error!("Set GATEHOUSE__SIGNING_KEY in the environment or a .env file");
        err
    })?;
    let gateway_config = GatewayConfig::from_env()?;

    let gateway = build_gateway(
        &identity,
        &gateway_config,
        Arc::new(InMemoryPrincipalStore::new()),
    )?;

    if let (Some(email), Some(password)) = (args.admin_email, args.admin_password) {
        bootstrap_admin(&gateway, &BootstrapAdmin { email, password }).await?;
    }

    let codec = gateway.codec();
    info!(
        ttl_seconds = codec.ttl_seconds(),
        subject_claim = codec.subject_claim(),
        argon2 = ?gateway.service().verifier().params(),
        "Authentication pipeline ready"
    );

    let app = create_app(gateway);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(
        "{}",
        format!("Gatehouse running on http://{addr}").bright_green()
    );
    info!(
        "{}",
        format!("Health check available at: http://{addr}/health").bright_blue()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Gatehouse stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn print_startup_banner() {
    println!("{}", "╔══════════════════════════════════════╗".bright_cyan());
    println!("{}", "║              GATEHOUSE               ║".bright_cyan());
    println!("{}", "║     token authentication gateway     ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════╝".bright_cyan());
    println!();
}
