//! EventHerald dispatcher binary entrypoint.

use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use herald_common::config::AppConfig;
use herald_common::db::{create_pool, create_redis_pool};
use herald_common::types::RunOutcome;
use herald_mailer::{MailTransport, SendGridMailer};

use herald_dispatcher::engine::DispatchEngine;
use herald_dispatcher::queue::{DispatchQueue, handle_payload};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_dispatcher=info,herald_mailer=debug".into()),
        )
        .json()
        .init();

    tracing::info!("EventHerald dispatcher starting...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Connect to database
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    // Connect to the dispatch queue
    let redis = create_redis_pool(&config.redis_url).await?;
    let mut queue = DispatchQueue::new(redis, config.dispatch_queue.clone());

    let engine = DispatchEngine::new(SendGridMailer::new(
        config.sendgrid_api_key.clone(),
        config.from_email.clone(),
    ));

    tracing::info!(queue = %config.dispatch_queue, "Dispatch queue consumer started");

    // Run with graceful shutdown on Ctrl+C
    tokio::select! {
        result = consume(&mut queue, &engine, &pool) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Queue consumer exited with error");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping gracefully...");
        }
    }

    tracing::info!("EventHerald dispatcher stopped.");
    Ok(())
}

/// Consume dispatch messages until the queue connection fails. Each message
/// is one invocation; a failed invocation is logged and the loop moves on.
async fn consume<T: MailTransport>(
    queue: &mut DispatchQueue,
    engine: &DispatchEngine<T>,
    pool: &PgPool,
) -> anyhow::Result<()> {
    loop {
        let payload = queue.next().await?;

        match handle_payload(engine, pool, &payload).await {
            Ok(RunOutcome::Partial { notified, total }) => {
                tracing::warn!(notified, total, "Dispatch run finished with failed sends");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Dispatch invocation failed");
            }
        }
    }
}
