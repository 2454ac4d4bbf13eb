use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paylink_core::auth::ApiKeys;
use paylink_core::paystack::PaystackClient;
use paylink_core::services::PaymentService;
use paylink_core::{AppState, config, create_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let paystack = PaystackClient::new(
        config.paystack_base_url.clone(),
        config.paystack_secret_key.clone(),
        Duration::from_secs(config.paystack_timeout_secs),
    );
    tracing::info!(
        "Paystack client initialized with URL: {}",
        config.paystack_base_url
    );

    let state = AppState {
        db: pool.clone(),
        payments: PaymentService::new(pool, paystack),
        api_keys: ApiKeys::new(config.api_keys.clone()),
    };

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
