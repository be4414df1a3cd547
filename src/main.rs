use std::sync::Arc;

use lantern::app::{self, InMemoryUserStore};
use lantern::config::Config;
use lantern::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let store = Arc::new(InMemoryUserStore::load(&cfg.app.users_file));
    let router = Arc::new(app::build_router(&cfg, store)?);

    tokio::select! {
        res = server::listener::run(&cfg, router) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
