use anyhow::Result;
use chrono::Utc;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use vishub_ai::{DryRunEstimator, OpenAiProvider, PromptEvaluator, RandomEstimator, RandomEvaluator};
use vishub_storage::HubStore;

use vishub_server::app;
use vishub_server::config::{self, EvaluatorConfig};
use vishub_server::healthcheck::scheduler::ScheduleRunner;
use vishub_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  vishub-server [config.toml]    Start the server");
}

fn build_evaluator(config: &EvaluatorConfig) -> Result<Arc<dyn PromptEvaluator>> {
    match config.provider.as_str() {
        "openai" => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("[evaluator].api_key is required for the openai provider"))?;
            let provider = OpenAiProvider::new(
                api_key,
                config.model.clone(),
                config.base_url.clone(),
                config.timeout_secs,
                None,
                None,
            )?;
            Ok(Arc::new(provider))
        }
        "random" => Ok(Arc::new(RandomEvaluator::new(config.mention_probability))),
        other => anyhow::bail!("unknown evaluator provider: {other}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vishub=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if matches!(args.get(1).map(|s| s.as_str()), Some("--help" | "-h")) {
        print_usage();
        return Ok(());
    }

    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/server.toml");
    let config = config::ServerConfig::load(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        data_dir = %config.database.data_dir,
        db = %config.database.url,
        evaluator = %config.evaluator.provider,
        "vishub-server starting"
    );

    // Build components
    let db_url = config.database.connection_url();
    let store = Arc::new(HubStore::new(&db_url, Path::new(&config.database.data_dir)).await?);
    let evaluator = build_evaluator(&config.evaluator)?;
    let estimator: Arc<dyn DryRunEstimator> = Arc::new(RandomEstimator);

    // JWT secret: use configured value or generate random
    let jwt_secret = match &config.auth.jwt_secret {
        Some(secret) => Arc::new(secret.clone()),
        None => {
            let secret = vishub_storage::auth::generate_token();
            tracing::warn!("No jwt_secret configured. A random secret was generated and will change on restart. Set [auth].jwt_secret in config for production use.");
            Arc::new(secret)
        }
    };

    // Default admin account: create if users table is empty
    match store.count_users().await {
        Ok(0) => {
            let password_hash = vishub_storage::auth::hash_password(&config.auth.default_password)?;
            match store
                .create_user(&config.auth.default_username, &password_hash)
                .await
            {
                Ok(_) => {
                    tracing::info!(
                        username = %config.auth.default_username,
                        "Created default admin account"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create default admin account");
                }
            }
        }
        Ok(count) => {
            tracing::info!(
                count,
                "Users table already has accounts, skipping default admin creation"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to check users table");
        }
    }

    let state = AppState {
        store: store.clone(),
        evaluator: evaluator.clone(),
        estimator,
        jwt_secret,
        token_expire_secs: config.auth.token_expire_secs,
        start_time: Utc::now(),
        config: Arc::new(config.clone()),
    };

    // HTTP/REST server
    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state.clone());
    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;
    let http_server = axum::serve(http_listener, app);

    // Weekly health check / monthly competitor retest scheduler
    let schedule_handle = if config.schedule.enabled {
        let runner = ScheduleRunner::new(
            store.clone(),
            evaluator.clone(),
            config.schedule.tick_secs,
            config.schedule.weekly_interval_secs,
            config.schedule.monthly_interval_secs,
        );
        Some(tokio::spawn(async move {
            runner.run().await;
        }))
    } else {
        tracing::info!("Schedule runner disabled");
        None
    };

    tracing::info!(http = %http_addr, "Server started");

    tokio::select! {
        result = http_server.with_graceful_shutdown(async { signal::ctrl_c().await.ok(); }) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server error");
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
        }
    }

    if let Some(h) = schedule_handle {
        h.abort();
    }
    tracing::info!("Server stopped");

    Ok(())
}
