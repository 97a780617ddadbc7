//! Contract Risk Server
//!
//! REST front end for the contract risk pipeline. Accepts PDF, DOCX, DOC
//! and TXT uploads as base64 JSON and provides endpoints for:
//!
//! - Text extraction with entity scan
//! - Rule-only quick scan for high-risk clauses
//! - Clause-level risk analysis and a downloadable consultation brief
//! - Per-document audit trail
//!
//! ## Classification
//!
//! When `OPENAI_API_KEY` is set, clauses are classified by the LLM delegate;
//! otherwise the local rule engine is used. Either way a delegate failure
//! degrades a clause to Unknown rather than failing the request.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use risk_engine::{AnalyzerConfig, Analyzer, LlmConfig, LlmDelegate};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod audit;
mod error;

use api::{
    handle_analyze, handle_audit, handle_brief, handle_extract, handle_health,
    handle_list_formats, handle_quick_scan,
};
use audit::AuditStore;

/// Command-line arguments for the contract server
#[derive(Parser, Debug)]
#[command(name = "contract-server")]
#[command(about = "Contract risk analysis server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Directory for audit trail files; audit is kept in memory if unset
    #[arg(long, env = "CONTRACT_AUDIT_DIR")]
    audit_dir: Option<PathBuf>,

    /// Use the rule engine even when an LLM key is configured
    #[arg(long)]
    rules_only: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub audit: Arc<AuditStore>,
}

/// Routes plus CORS and tracing; rate limiting is layered on in `main`
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/formats", get(handle_list_formats))
        .route("/api/extract", post(handle_extract))
        .route("/api/quick-scan", post(handle_quick_scan))
        .route("/api/analyze", post(handle_analyze))
        .route("/api/brief", post(handle_brief))
        .route("/api/audit/:hash", get(handle_audit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_analyzer(config: AnalyzerConfig, rules_only: bool) -> anyhow::Result<Analyzer> {
    let llm = if rules_only { None } else { LlmConfig::from_env() };

    match llm {
        Some(llm) => {
            let delegate = LlmDelegate::new(llm).context("failed to build LLM client")?;
            info!("Classifying with LLM delegate (model {})", delegate.model());
            Ok(Analyzer::new(Arc::new(delegate), config))
        }
        None => {
            info!("Classifying with rule engine");
            Ok(Analyzer::with_rules(config))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting contract server on {}:{}", args.host, args.port);

    let config = AnalyzerConfig::from_env()?;
    let analyzer = build_analyzer(config, args.rules_only)?;

    let audit = match &args.audit_dir {
        Some(dir) => AuditStore::persistent(dir.clone()).await?,
        None => AuditStore::in_memory(),
    };

    let state = AppState {
        analyzer,
        audit: Arc::new(audit),
    };

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .context("invalid rate limit configuration")?,
    );

    let app = app(state).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    match &args.audit_dir {
        Some(dir) => info!("Audit trail: {}", dir.display()),
        None => info!("Audit trail: in memory"),
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
