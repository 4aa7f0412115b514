//! Quest ledger server: REST endpoints plus a natural-language chat
//! endpoint over an in-memory quest store.

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use qm_server::config::ServerConfig;
use qm_server::routes;
use qm_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "qm-server starting");

    // ── Load config ─────────────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path = %path, "loading config file");
            ServerConfig::from_file(&path)?
        }
        None => ServerConfig::default(),
    }
    .with_env_overrides()?;

    let state = AppState::from_config(&config)?;
    if std::env::var("QUEST_SAMPLE_DATA").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
        state.seed_sample_data().await?;
        tracing::info!("sample quests seeded");
    }

    let app = routes::build_router(state);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
