pub mod admin;
pub mod appresult;
pub mod assets;
pub mod config;
pub mod polls;
pub mod res;
pub mod store;
pub mod voter;

use axum::{extract::{DefaultBodyLimit, FromRef}, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};

use assets::Assets;
use config::Config;
use store::PollStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: PollStore,
    pub assets: Assets,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            store: PollStore::new(),
            assets: Assets::from_config(&config.assets).await?,
        })
    }
}

pub fn app(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api", polls::router())
        .nest("/admin", admin::router());

    res::uploads(router, &state.assets)
        .fallback_service(res::pages(&config.static_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
