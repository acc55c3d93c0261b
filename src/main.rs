mod config;
mod db;
mod handlers;
mod models;
mod parsers;
mod router;
mod services;
mod utils;

use anyhow::Context;
use std::io::Read;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use db::Store;
use services::access::AccessCallback;
use services::acl_alias_mapping::{CommandRunner, SshCommandRunner};
use services::template::TemplateEngine;
use services::ServiceContext;

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub config: Config,
    pub templates: TemplateEngine,
    pub runner: Arc<dyn CommandRunner>,
    pub access: AccessCallback,
}

impl AppState {
    /// Context handed to service callbacks
    pub fn service_context(&self) -> ServiceContext<'_> {
        ServiceContext {
            store: &self.store,
            templates: &self.templates,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "service_packs=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("extract") {
        return extract_offline(args.get(1).map(String::as_str));
    }

    // Load configuration
    let cfg = Config::load();
    tracing::info!("Starting Service Packs");
    tracing::info!("Database: {}", cfg.db_path);
    tracing::info!("Templates Dir: {}", cfg.templates_dir);
    tracing::info!("Listen: {}", cfg.listen_addr);

    // Initialize database
    let store = Store::with_pool_size(&cfg.db_path, cfg.db_max_connections).await?;
    tracing::info!("Database initialized (pool_size={})", cfg.db_max_connections);

    let templates = TemplateEngine::load(&cfg.templates_dir)?;
    tracing::info!("Templates: {}", templates.names().join(", "));

    let state = Arc::new(AppState {
        store,
        config: cfg.clone(),
        templates,
        runner: Arc::new(SshCommandRunner {
            timeout_secs: cfg.ssh_timeout_secs,
        }),
        access: AccessCallback::new(cfg.vlan_pool.clone()),
    });

    // Build router
    let app = router::build(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!("Service Packs listening on {}", cfg.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service Packs shutting down");
    Ok(())
}

/// `service-packs extract [FILE]`: print the port table of FILE (or stdin) as JSON
fn extract_offline(path: Option<&str>) -> anyhow::Result<()> {
    let json = match path {
        Some(p) if p != "-" => {
            let file = std::fs::File::open(p).with_context(|| format!("Failed to read {}", p))?;
            extract_json(file)?
        }
        _ => extract_json(std::io::stdin().lock())?,
    };
    println!("{}", json);
    Ok(())
}

/// Extract the port table from command output and render it as pretty JSON
fn extract_json(mut input: impl Read) -> anyhow::Result<String> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .context("Failed to read command output")?;

    let table = parsers::extract(&text);
    tracing::info!("Extracted {} port aliases", table.len());
    Ok(serde_json::to_string_pretty(&table)?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
