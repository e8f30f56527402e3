use std::sync::Arc;

use agent_core::Config;
use server::state::AppState;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("Starting notes chatbot server");

    let config = Config::load_from_env().unwrap_or_else(|e| {
        warn!(error = %e, "could not load config, using development defaults");
        Config::default()
    });

    let notes_dir = config.rag.with_env_overrides().notes_dir;
    std::fs::create_dir_all(&notes_dir)?;

    let state = Arc::new(AppState::new(config));
    server::run(state).await
}
