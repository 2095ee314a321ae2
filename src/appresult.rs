use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use tracing::error;

use crate::store::PollError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<PollError>() {
            Some(PollError::Validation(_)) | Some(PollError::InvalidOption) => {
                StatusCode::BAD_REQUEST
            }
            Some(PollError::NotFound) => StatusCode::NOT_FOUND,
            Some(PollError::DuplicateVote) => StatusCode::FORBIDDEN,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.0.downcast_ref::<PollError>() {
            Some(err) => err.to_string(),
            None => {
                error!("{:#}\n\n{}", self.0, self.0.backtrace());
                "Server error".to_owned()
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
