mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::sync::Arc;

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

use crate::repository::postgres::{create_pool, PostgresRatingRepository};
use crate::usecase::contracts::RatingRepository;
use crate::usecase::ratings::RatingsUseCase;

pub struct AppState<R: RatingRepository> {
    pub ratings_usecase: RatingsUseCase<R>,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let tracer_provider = if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig::from(&config);
        Some(telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)?)
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter)?;
        None
    };

    tracing::info!("starting the rating service");

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    tracing::info!("config loaded, telemetry_enabled={}", config.telemetry_enabled);

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("failed to create database pool")?;
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let rating_repository = PostgresRatingRepository::new(pool);
    let ratings_usecase = RatingsUseCase::new(rating_repository);

    let shared_state = Arc::new(AppState {
        ratings_usecase,
        metrics_handle,
    });

    let router = delivery::http::v1::router(shared_state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("rating service running on {}", config.http_addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(provider) = tracer_provider {
        telemetry::shutdown_telemetry(provider);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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

    tracing::info!("shutdown signal received, draining connections");
}
