use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Database;
use tokio_util::sync::CancellationToken;

mod scheduler;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "perla={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let timezone = settings.business.timezone()?;
    let payroll = settings.business.payroll()?;
    let db = parse_database(&settings.server.database).await?;
    let engine = Arc::new(
        engine::Engine::builder()
            .database(db.clone())
            .timezone(timezone)
            .payroll(payroll)
            .build()
            .await?,
    );
    tracing::info!(
        timezone = %timezone,
        today = %engine.today(),
        "engine ready"
    );

    let token = CancellationToken::new();
    let mut tasks = tokio::task::JoinSet::new();

    if settings.scheduler.enabled {
        let auto_close = scheduler::AutoClose::new(
            engine.clone(),
            settings.scheduler.close_time()?,
            settings.scheduler.backfill_days,
        );
        let token = token.clone();
        tasks.spawn(async move { auto_close.run(token).await });
    } else {
        tracing::info!("auto-close scheduler disabled");
    }

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server_token = token.clone();
    tasks.spawn(async move {
        let shutdown = async move { server_token.cancelled().await };
        if let Err(err) = server::run_with_listener(engine, db, listener, shutdown).await {
            tracing::error!("server failed: {err}");
        }
    });

    tokio::select! {
        _ = shutdown_signal() => tracing::info!("shutdown requested"),
        _ = tasks.join_next() => tracing::warn!("a task stopped, shutting down"),
    }
    token.cancel();
    while tasks.join_next().await.is_some() {}

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
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

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
