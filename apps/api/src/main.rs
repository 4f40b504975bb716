mod auth;
mod config;
mod delivery;
mod errors;
mod llm_client;
mod outreach;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, MailerConfig};
use crate::delivery::{resend, Mailer, ResendMailer};
use crate::llm_client::build_backend;
use crate::outreach::generator::EmailService;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails when no backend key is set)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Outreach API v{}", env!("CARGO_PKG_VERSION"));

    // Style table (word limits, banned phrases, subject templates)
    let style = config.load_style()?;
    style.check().context("Invalid style spec")?;

    // Initialize generation backend
    let backend = build_backend(&config.backend, config.llm_timeout)
        .context("Failed to build LLM backend")?;
    let email_service = Arc::new(EmailService::new(
        backend,
        Arc::new(style),
        config.llm_timeout,
    ));
    info!(
        "LLM backend initialized: {} (model: {}, timeout: {:?})",
        email_service.backend_kind(),
        email_service.backend_model(),
        config.llm_timeout
    );

    // Initialize email delivery (optional)
    let mailer = match &config.mailer {
        Some(mailer_config) => {
            let mailer = build_mailer(mailer_config, &config)?;
            info!("Resend mailer initialized (from: {})", mailer_config.from_email);
            Some(mailer)
        }
        None => {
            warn!("RESEND_API_KEY not set; /email/send will answer 503");
            None
        }
    };

    let state = AppState {
        email_service,
        mailer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the Resend mailer, sharing the LLM timeout as its HTTP bound.
fn build_mailer(mailer_config: &MailerConfig, config: &Config) -> Result<Arc<dyn Mailer>> {
    let client = reqwest::Client::builder()
        .timeout(config.llm_timeout)
        .build()
        .context("Failed to build HTTP client for email delivery")?;

    Ok(Arc::new(ResendMailer::new(
        client,
        mailer_config.api_key.clone(),
        resend::DEFAULT_BASE_URL.to_string(),
        mailer_config.from_name.clone(),
        mailer_config.from_email.clone(),
    )))
}
