use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payflow_core::services::orchestrator::PaymentOrchestrator;
use payflow_core::services::webhook::WebhookDispatcher;
use payflow_core::{AppState, config, create_app, db, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config).await?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let report = startup::validate_environment(&config, &pool).await?;
    report.print();
    if !report.is_valid() {
        anyhow::bail!("startup validation failed");
    }

    let webhooks = WebhookDispatcher::new(
        config.webhook_secret.clone(),
        config.merchant_callback_url.clone(),
        Duration::from_secs(config.webhook_timeout_secs),
    )?;
    let orchestrator = PaymentOrchestrator::new(
        pool.clone(),
        webhooks,
        config.public_base_url.clone(),
        Duration::from_secs(config.partner_timeout_secs),
    )?;

    let app = create_app(AppState {
        db: pool,
        orchestrator,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
