mod new;
mod poll;
mod vote;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    store::{Poll, PollError, PollId, PollOption},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/poll", post(new::create_poll))
        .route("/poll/{id}", get(poll::get_poll).put(poll::edit_poll))
        .route("/poll/{id}/vote", post(vote::vote))
}

/// A poll as shown to voters. The voter list stays on the server; callers
/// only learn whether they themselves already voted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: PollId,
    pub question: String,
    pub logo: Option<String>,
    pub options: Vec<PollOption>,
    pub has_voted: bool,
}

impl PollView {
    pub fn for_voter(poll: Poll, voter_ip: &str) -> Self {
        let has_voted = poll.has_voted(voter_ip);
        Self::new(poll, has_voted)
    }

    pub fn new(poll: Poll, has_voted: bool) -> Self {
        Self {
            id: poll.id,
            question: poll.question,
            logo: poll.logo,
            options: poll.options,
            has_voted,
        }
    }
}

/// `optionsTexts` arrives as a JSON-encoded string from forms, and may be a
/// plain array in JSON bodies.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OptionsTexts {
    Encoded(String),
    List(Vec<String>),
}

impl OptionsTexts {
    pub(crate) fn decode(self) -> anyhow::Result<Vec<String>> {
        match self {
            Self::Encoded(encoded) => {
                serde_json::from_str(&encoded).context("decoding optionsTexts")
            }
            Self::List(list) => Ok(list),
        }
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<PollId, PollError> {
    raw.parse().map_err(|_| PollError::NotFound)
}
