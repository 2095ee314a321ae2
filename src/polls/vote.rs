use axum::{
    body::Bytes,
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{store::PollStore, voter::VoterIp, AppResult};

use super::{parse_id, PollView};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoteRequest {
    #[serde(default)]
    option_index: Value,
}

/// Accepts `1`, `1.0` and `"1"` alike; anything else, including `"01"` or
/// `"+1"`, names no option.
fn option_index(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .and_then(|index| usize::try_from(index).ok()),
        Value::String(text) => text
            .parse::<usize>()
            .ok()
            .filter(|index| index.to_string() == *text),
        _ => None,
    }
}

#[debug_handler]
pub(crate) async fn vote(
    State(store): State<PollStore>,
    Path(id): Path<String>,
    VoterIp(ip): VoterIp,
    body: Bytes,
) -> AppResult<Json<PollView>> {
    let id = parse_id(&id)?;
    let request: VoteRequest = if body.is_empty() {
        VoteRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };

    let poll = store.vote(id, option_index(&request.option_index), &ip)?;
    Ok(Json(PollView::new(poll, true)))
}
