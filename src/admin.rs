use axum::{debug_handler, extract::State, routing::get, Json, Router};

use crate::{
    store::{Poll, PollStore},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/polls", get(list_polls))
}

/// Full records, voter list included.
#[debug_handler]
pub(crate) async fn list_polls(State(store): State<PollStore>) -> Json<Vec<Poll>> {
    Json(store.list_polls())
}
