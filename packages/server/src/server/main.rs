// Main entry point for the circle matching API server

use std::sync::Arc;

use agora::{AgoraOptions, AgoraService};
use anyhow::{Context, Result};
use circle_core::domains::circles::{CircleFactory, PgCircleStore};
use circle_core::domains::matching::engine::MatchingService;
use circle_core::domains::matching::queue::{BaseMatchQueue, RedisMatchQueue};
use circle_core::domains::midnight::ExpirySweeper;
use circle_core::kernel::{
    start_scheduler, AgoraAdapter, BasePushChannel, NatsPushChannel, NoopPushChannel,
    OpenAiClient, ServerDeps, SystemClock,
};
use circle_core::server::build_app;
use circle_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,circle_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Circle Matching API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Matching queue (degrades to a no-op without Redis)
    let queue: Arc<dyn BaseMatchQueue> = match &config.redis_url {
        Some(url) => Arc::new(RedisMatchQueue::connect(url).await),
        None => {
            tracing::warn!("REDIS_URL not configured - matching queue disabled");
            Arc::new(RedisMatchQueue::disabled())
        }
    };

    // Push channel (degrades to dropping notifications without NATS)
    let push: Arc<dyn BasePushChannel> = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!("NATS connected");
                Arc::new(NatsPushChannel::new(client))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to connect to NATS - notifications disabled");
                Arc::new(NoopPushChannel)
            }
        },
        None => {
            tracing::warn!("NATS_URL not configured - notifications disabled");
            Arc::new(NoopPushChannel)
        }
    };

    // Voice provisioning (unconfigured credentials fall back to placeholders
    // at circle creation)
    let agora = AgoraService::new(AgoraOptions {
        app_id: config.agora_app_id.clone().unwrap_or_default(),
        app_certificate: config.agora_app_certificate.clone().unwrap_or_default(),
    });
    if !agora.is_configured() {
        tracing::warn!(
            "AGORA_APP_ID / AGORA_APP_CERTIFICATE not configured - placeholder voice credentials will be issued"
        );
    }

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not configured - summaries will use fallback messages");
    }

    let deps = Arc::new(ServerDeps::new(
        pool.clone(),
        queue.clone(),
        Arc::new(PgCircleStore::new(pool.clone())),
        Arc::new(AgoraAdapter::new(Arc::new(agora))),
        push,
        Arc::new(OpenAiClient::new(config.openai_api_key.clone())),
        Arc::new(SystemClock),
    ));

    let factory = CircleFactory::new(
        deps.circles.clone(),
        deps.voice.clone(),
        deps.push.clone(),
        deps.clock.clone(),
        config.min_circle_size,
        config.max_circle_size,
    );
    let matching = Arc::new(MatchingService::new(
        queue,
        factory,
        config.min_circle_size,
        config.max_circle_size,
    ));
    let sweeper = Arc::new(ExpirySweeper::new(deps.circles.clone(), deps.clock.clone()));

    // Background timers: 30s matching backstop + hourly midnight sweep
    let mut scheduler = start_scheduler(matching.clone(), sweeper)
        .await
        .context("Failed to start scheduled tasks")?;

    // Build application
    let app = build_app(deps, matching);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the timers before the store handles drop
    scheduler
        .shutdown()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shut down scheduler: {}", e))?;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
