use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use homodgcat_backend::config;
use homodgcat_backend::talk::DatasetStore;
use homodgcat_backend::text::TextTable;
use state::AppState;

/// Build the HTTP router / 构建路由
fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(api::server::health_check))
        .route("/", get(api::talk::index))
        .route("/:lang", get(api::talk::language_page))
        .route("/:lang/query_keyword", get(api::talk::query_keyword))
        .route("/:lang/query_collection", get(api::talk::query_collection))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homodgcat_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config().map_err(anyhow::Error::msg)?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Search worker pool / 查询线程池
    let workers = app_config.talk.worker_threads();
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;
    tracing::info!("Search pool started with {} workers", workers);

    let text = TextTable::load(&app_config.talk.text_path)?;
    let store = DatasetStore::load(&app_config.talk, &text).await?;
    tracing::info!(
        "Serving languages {} (default {})",
        store.languages().join(","),
        store.default_language()
    );

    let state = Arc::new(AppState::new(app_config.talk.clone(), store, text));

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
