//! Donations backend entry-point: loads settings, wires storage, and serves
//! the REST API.

mod server;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use donations::inbound::http::health::HealthState;
use donations::inbound::http::session_config::{
    BuildMode, fingerprint::key_fingerprint, session_settings,
};
use donations::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use donations::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|error| eyre!("failed to load settings: {error}"))?;
    let session = session_settings(
        &settings.session_toggles(),
        BuildMode::from_debug_assertions(),
    )
    .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind_addr = settings.bind_addr()?;
    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    );

    if let Some(pool) = connect_database(&settings).await? {
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(initialize_metrics(|| {
            PrometheusMetricsBuilder::new("donations")
                .endpoint("/metrics")
                .build()
        }));
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "server listening");
    server.await?;
    Ok(())
}

/// Open the connection pool and apply migrations when a database is configured.
async fn connect_database(settings: &AppSettings) -> Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    if settings.run_migrations {
        run_pending_migrations(url)
            .await
            .wrap_err("database migrations failed")?;
    }
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("failed to build database pool")?;
    Ok(Some(pool))
}

/// Build Prometheus middleware, logging and continuing without metrics on failure.
#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(build: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> std::result::Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(%error, "metrics disabled: Prometheus initialisation failed");
            None
        }
    }
}
