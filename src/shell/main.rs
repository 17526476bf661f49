use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, fmt};

use visit_logs::modules::visits::adapters::outbound::directory_in_memory::InMemoryDirectory;
use visit_logs::modules::visits::adapters::outbound::visit_log_store_in_memory::InMemoryVisitLogStore;
use visit_logs::shared::infrastructure::postgres;
use visit_logs::shell::config::Config;
use visit_logs::shell::graphql::{build_schema, graphiql, graphql};
use visit_logs::shell::http::router;
use visit_logs::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let state = match &config.database {
        Some(database) => {
            let pool = postgres::connect(database).await?;
            AppState::postgres(pool, config.resolver)
        }
        None => {
            let directory = match &config.seed_path {
                Some(path) => InMemoryDirectory::load_seed(path)?,
                None => {
                    tracing::warn!("no SEED_PATH given, the visitor directory is empty");
                    InMemoryDirectory::new()
                }
            };
            AppState::in_memory(
                Arc::new(directory),
                Arc::new(InMemoryVisitLogStore::new()),
                config.resolver,
            )
        }
    };

    let schema = build_schema(state.clone());

    let app = Router::new()
        .route("/gql", get(graphiql).post(graphql))
        .layer(Extension(schema))
        .merge(router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!(
        utc_offset = %config.resolver.utc_offset,
        duplicate_scan_window_secs = config.resolver.duplicate_scan_window.num_seconds(),
        "HTTP API: http://{}/api/scanned_visitors, GraphQL: http://{}/gql",
        config.bind_addr,
        config.bind_addr
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
