use std::sync::Arc;

use anyhow::Context;

use topoauth_api::config::ApiConfig;
use topoauth_auth::RolePolicy;
use topoauth_infra::InMemoryModelStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    topoauth_observability::init();

    let config = ApiConfig::from_env();

    let store = match &config.seed_file {
        Some(path) => InMemoryModelStore::from_path(path)
            .with_context(|| format!("failed to seed model store from {}", path.display()))?,
        None => {
            tracing::warn!("no seed file configured; model store starts empty");
            InMemoryModelStore::new()
        }
    };

    let bind_addr = config.bind_addr;
    let app = topoauth_api::app::build_app(config, Arc::new(store), Arc::new(RolePolicy));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
