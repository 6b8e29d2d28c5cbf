//! # Bazaar Server
//!
//! Identity front door for the Bazaar marketplace.
//!
//! ## Overview
//!
//! - **Registration**: customer and vendor sign-up with email confirmation
//! - **Sessions**: short-lived signed access tokens plus rotating refresh tokens
//! - **Recovery**: emailed password reset codes
//! - **Policy**: role checks for downstream services
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - `bazaar-core` for every credential and token decision
//! - An SMTP relay (lettre) for outbound mail, or the log in development

use std::net::SocketAddr;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser};
use secrecy::{ExposeSecret, SecretString};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bazaar_core::domain::users::auth::domain::services::AdminProvisionOutcome;
use bazaar_server::{
    AppState,
    infra::{config::Config, startup::build_app_state},
    routes,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "bazaar-server")]
#[command(about = "Identity and token-lifecycle service for the Bazaar marketplace")]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Provision this admin account before serving
    #[arg(long, env = "BOOTSTRAP_ADMIN_EMAIL", requires = "admin_password")]
    admin_email: Option<String>,

    /// Password for the bootstrap admin account
    #[arg(long, env = "BOOTSTRAP_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads env-backed flags
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    run_server(cli.serve).await
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server_host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                // Quieter defaults. Override via RUST_LOG.
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.dev_mode {
        warn!("DEV_MODE enabled: CORS is permissive");
    }

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .context("invalid SERVER_HOST/SERVER_PORT")?;

    let state = build_app_state(config)?;

    if let (Some(email), Some(password)) = (args.admin_email, args.admin_password) {
        bootstrap_admin(&state, &email, &SecretString::from(password)).await?;
    }

    let router = routes::create_app(state);

    info!("Starting Bazaar identity server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn bootstrap_admin(
    state: &AppState,
    email: &str,
    password: &SecretString,
) -> anyhow::Result<()> {
    match state
        .accounts()
        .provision_admin(email, password.expose_secret())
        .await
    {
        AdminProvisionOutcome::Created(id) => {
            info!(user_id = %id, "bootstrap admin created");
            Ok(())
        }
        AdminProvisionOutcome::AlreadyExists => {
            info!("bootstrap admin already present");
            Ok(())
        }
        AdminProvisionOutcome::SystemError => {
            anyhow::bail!("bootstrap admin could not be created; check the password policy")
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
