use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use school_api::app::{app, AppState};
use school_api::auth::Passwords;
use school_api::config::{self, StoreBackend};
use school_api::database::{MemoryStore, PgStore, Store};
use school_api::is_production;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    let config = config::config();
    init_tracing(config.api.enable_request_logging);
    tracing::info!("Starting School API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match config.store {
        StoreBackend::Postgres => {
            let pg = PgStore::connect(&config.database)
                .await
                .context("failed to connect to PostgreSQL")?;
            if config.database.ensure_schema {
                pg.ensure_schema().await.context("failed to create schema")?;
            }
            Arc::new(pg)
        }
        StoreBackend::Memory => {
            if is_production!() {
                tracing::warn!(
                    "Running production with the in-memory store; data will not persist"
                );
            }
            Arc::new(MemoryStore::new())
        }
    };

    let passwords = Passwords::from_config(&config.security).context("invalid Argon2 parameters")?;
    let state = AppState::new(store, passwords, config.school.clone());
    let router = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("School API listening on http://{}", bind_addr);
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}

fn init_tracing(request_logging: bool) {
    let default = if request_logging {
        "school_api=info,tower_http=debug"
    } else {
        "school_api=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
