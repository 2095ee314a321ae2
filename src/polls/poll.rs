use axum::{
    body::Bytes,
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::{
    store::{PollEdit, PollError, PollStore},
    voter::VoterIp,
    AppResult,
};

use super::{parse_id, OptionsTexts, PollView};

pub(crate) const EDIT_FIELDS: &str = "Question and options are required.";

#[debug_handler]
pub(crate) async fn get_poll(
    State(store): State<PollStore>,
    Path(id): Path<String>,
    VoterIp(ip): VoterIp,
) -> AppResult<Json<PollView>> {
    let poll = store.get_poll(parse_id(&id)?)?;
    Ok(Json(PollView::for_voter(poll, &ip)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditPollRequest {
    question: Option<String>,
    options_texts: Option<OptionsTexts>,
}

#[debug_handler]
pub(crate) async fn edit_poll(
    State(store): State<PollStore>,
    Path(id): Path<String>,
    VoterIp(ip): VoterIp,
    body: Bytes,
) -> AppResult<Json<PollView>> {
    // an unknown poll is reported before anything about the body
    let id = store.get_poll(parse_id(&id)?)?.id;

    let request: EditPollRequest = if body.is_empty() {
        EditPollRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let (Some(question), Some(options_texts)) = (request.question, request.options_texts) else {
        return Err(PollError::Validation(EDIT_FIELDS).into());
    };
    let option_texts = options_texts.decode()?;

    let poll = store.edit_poll(
        id,
        PollEdit {
            question,
            option_texts,
        },
    )?;
    Ok(Json(PollView::for_voter(poll, &ip)))
}
