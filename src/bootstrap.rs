//! Process startup shared by the API server and the cron binary.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::adapters::catalog::catalog_for;
use crate::adapters::notification::TracingNotifier;
use crate::adapters::postgres;
use crate::application::GovernanceServices;
use crate::config::{AppConfig, ServerConfig};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `server.log_level` is used as the
/// whole filter directive. JSON output when `server.log_json` is true.
pub fn init_tracing(server: &ServerConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| configured_filter(server))
        .context("invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    if server.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("tracing already initialized")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("tracing already initialized")?;
    }
    Ok(())
}

fn configured_filter(
    server: &ServerConfig,
) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    EnvFilter::try_new(&server.log_level)
}

/// Loads and validates configuration from the environment.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Connects to Postgres and wires every handler over the production adapters.
pub async fn connect_services(config: &AppConfig) -> anyhow::Result<GovernanceServices> {
    let pool = postgres::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    tracing::info!(
        max_connections = config.database.max_connections,
        "Database pool created"
    );

    if config.database.run_migrations {
        postgres::migrate(&pool)
            .await
            .context("failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let catalog = catalog_for(&config.governance).context("failed to load tier catalog")?;
    let ports = postgres::ports(pool, Arc::new(catalog), Arc::new(TracingNotifier::new()));
    Ok(GovernanceServices::new(ports, &config.governance))
}
