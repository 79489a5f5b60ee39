use std::process::ExitCode;

use gateway::{
    config::Config,
    shutdown::shutdown_signal,
    store,
    subscriber::{log_notifications, subscribe},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = match store::connect(&config.redis_url).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Error subscribing: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let events = match subscribe(store.as_ref(), &config.notify_channel).await {
        Ok(events) => events,
        Err(e) => {
            tracing::error!("Error subscribing: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        received = log_notifications(events) => {
            tracing::error!("Subscription closed after {} messages", received);
            ExitCode::FAILURE
        }
        _ = shutdown_signal() => ExitCode::SUCCESS,
    }
}
