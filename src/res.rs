use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

use crate::{
    assets::{Assets, UPLOADS_ROUTE},
    AppState,
};

/// Front-end pages (`index.html`, `poll.html`, `admin.html`, scripts).
pub fn pages(static_dir: &Path) -> ServeDir {
    ServeDir::new(static_dir).append_index_html_on_directories(true)
}

/// Serves stored images back when they live on the local disk.
pub fn uploads(router: Router<AppState>, assets: &Assets) -> Router<AppState> {
    match assets {
        Assets::Local(local) => router.nest_service(UPLOADS_ROUTE, ServeDir::new(local.dir())),
        Assets::Disabled(_) | Assets::Remote(_) => router,
    }
}
