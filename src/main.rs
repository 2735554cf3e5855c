//! swarmd CLI entry point.
//!
//! Grounded on the teacher's `main.rs` startup sequence (load config, open
//! the store and run migrations, construct adapters, spawn background
//! tasks, serve) narrowed to this kernel's single daemon mode — the
//! teacher's many CLI subcommands have no counterpart here; `swarmd` is
//! always a long-running server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use swarmd::adapters::completer::AnthropicCompleter;
use swarmd::adapters::mcp::HttpMcpGateway;
use swarmd::adapters::sqlite::{all_embedded_migrations, open_pool, Migrator, SqliteStore};
use swarmd::api::{run_serve, AppState};
use swarmd::config::Config;
use swarmd::domain::models::CredentialRegistry;
use swarmd::domain::ports::{Completer, MCPGateway, NullComponentCatalog, Store};
use swarmd::services::{EventBus, Planner, RetryMonitor, RetryMonitorConfig, RoleRegistry, RoleVocabulary, ScopeExtractor, SwarmManager};

/// Multi-agent swarm orchestration kernel.
#[derive(Debug, Parser)]
#[command(name = "swarmd", about = "Swarm orchestration daemon")]
struct Cli {
    /// HTTP port to listen on.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Path to the SQLite database file.
    #[arg(long, env = "DB_PATH")]
    db_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }

    init_tracing(&config)?;

    if config.completer_keys.is_empty() {
        anyhow::bail!("no completer credentials configured (set COMPLETER_KEYS)");
    }

    let database_url = format!("sqlite:{}", config.db_path);
    let pool = open_pool(&database_url)
        .await
        .context("failed to open the store")?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("failed to run embedded migrations")?;
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));

    let completer: Arc<dyn Completer> = Arc::new(
        AnthropicCompleter::new(
            config.completer_keys.clone(),
            config.completer_model.clone(),
            Duration::from_secs(config.base_backoff_s),
            Duration::from_secs(config.max_backoff_s),
            config.max_retries,
        )
        .context("failed to construct the completer adapter")?,
    );

    let mcp_gateway: Arc<dyn MCPGateway> = Arc::new(
        HttpMcpGateway::new(config.mcp_url.clone(), config.mcp_credential.clone(), Duration::from_secs(30))
            .context("failed to construct the MCP gateway adapter")?,
    );

    let event_bus = EventBus::new();
    let role_registry = RoleRegistry::load(RoleVocabulary::parse(&config.role_vocabulary));
    let scope_extractor = ScopeExtractor::new(
        completer.clone(),
        Arc::new(NullComponentCatalog),
        default_tech_stack(),
    );
    let planner = Planner::new(completer.clone());
    // Both the default and legacy vocabularies name exactly three roles; a
    // freshly-created swarm gets the full vocabulary absent an explicit
    // `num_agents` override (see `POST /swarms`, which takes one directly).
    const DEFAULT_NUM_AGENTS: u32 = 3;
    let swarm_manager = Arc::new(SwarmManager::new(
        store.clone(),
        planner,
        scope_extractor,
        role_registry,
        event_bus.clone(),
        DEFAULT_NUM_AGENTS,
        config.max_retries,
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let retry_monitor = RetryMonitor::new(
        store.clone(),
        event_bus.clone(),
        RetryMonitorConfig {
            poll_interval: Duration::from_secs(config.poll_interval_s),
            max_retries: config.max_retries,
            base_backoff: Duration::from_secs(config.base_backoff_s),
            max_backoff: Duration::from_secs(config.max_backoff_s),
        },
    );
    let retry_monitor_handle = tokio::spawn(retry_monitor.run(shutdown_rx));

    let credentials = CredentialRegistry::from_entries(&config.api_credentials, "api-credential")
        .with_admin_master(config.admin_master_token.as_deref());

    let state = AppState {
        store,
        swarm_manager,
        mcp_gateway,
        credentials: Arc::new(credentials),
        started_at: std::time::Instant::now(),
        poll_interval_s: config.poll_interval_s,
    };

    let result = run_serve(state, config.port).await;

    let _ = shutdown_tx.send(true);
    let _ = retry_monitor_handle.await;

    result
}

fn default_tech_stack() -> Vec<(String, String)> {
    vec![("frontend".to_string(), "react".to_string())]
}

fn parse_log_level(level: &str) -> Result<tracing::Level> {
    level
        .parse()
        .with_context(|| format!("invalid log level: {level}"))
}

fn init_tracing(config: &Config) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Layer};

    let default_level = parse_log_level(&config.log_level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::from_level(default_level).into())
        .from_env_lossy();

    let fmt_layer = if config.log_format == "json" {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
    Ok(())
}
