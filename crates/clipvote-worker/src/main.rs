//! Video processing worker binary.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipvote_db::DbConfig;
use clipvote_media::Transformer;
use clipvote_queue::RedisQueue;
use clipvote_storage::StorageManager;
use clipvote_worker::{Processor, RetryPolicy, Worker};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // JSON logs in production, colored output for dev
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::from_default_env().add_directive("clipvote=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("Starting clipvote-worker");

    let retry = RetryPolicy::from_env();
    info!("Retry policy: {:?}", retry);

    let pool = match clipvote_db::create_pool(&DbConfig::from_env()).await {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let storage = match StorageManager::from_env().await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to configure storage: {}", e);
            std::process::exit(1);
        }
    };

    let queue = match RedisQueue::from_env() {
        Ok(q) => q,
        Err(e) => {
            error!("Failed to create queue client: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = queue.init().await {
        error!("Failed to initialize queue: {}", e);
        std::process::exit(1);
    }

    let processor = Processor::new(pool, storage, Transformer::from_env());
    let worker = Arc::new(Worker::new(Arc::new(queue), processor, retry));

    // Stop the loop on SIGINT/SIGTERM
    let signal_worker = Arc::clone(&worker);
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_worker.shutdown();
    });

    if let Err(e) = worker.run().await {
        error!("Worker error: {}", e);
        std::process::exit(1);
    }

    info!("Worker shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Received shutdown signal");
}
