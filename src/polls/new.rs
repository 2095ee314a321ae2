use axum::{
    debug_handler,
    extract::{multipart::Field, FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    assets::{Assets, Upload},
    store::{validate_new_poll, NewPoll, PollError, PollStore},
    AppError, AppResult, AppState,
};

use super::{OptionsTexts, PollView};

pub(crate) const MAX_OPTION_IMAGES: usize = 10;

const TOO_MANY_IMAGES: &str = "At most 10 option images are allowed.";

/// Body of `POST /api/poll`, either `multipart/form-data` or JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePollForm {
    question: Option<String>,
    options_texts: Option<OptionsTexts>,
    #[serde(skip)]
    logo: Option<Upload>,
    #[serde(skip)]
    option_images: Vec<Upload>,
}

impl CreatePollForm {
    async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            match name.as_str() {
                "question" => form.question = Some(field.text().await?),
                "optionsTexts" => {
                    form.options_texts = Some(OptionsTexts::Encoded(field.text().await?));
                }
                "pollLogo" => form.logo = Some(upload(field).await?),
                "optionsImages" => {
                    if form.option_images.len() == MAX_OPTION_IMAGES {
                        return Err(PollError::Validation(TOO_MANY_IMAGES).into());
                    }
                    form.option_images.push(upload(field).await?);
                }
                other => debug!(field = other, "ignoring form field"),
            }
        }

        Ok(form)
    }
}

async fn upload(field: Field<'_>) -> AppResult<Upload> {
    Ok(Upload {
        file_name: field.file_name().map(str::to_owned),
        content_type: field.content_type().map(str::to_owned),
        bytes: field.bytes().await?,
    })
}

impl<S> FromRequest<S> for CreatePollForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if is_multipart {
            Self::from_multipart(Multipart::from_request(req, state).await?).await
        } else {
            let Json(form) = Json::<Self>::from_request(req, state).await?;
            Ok(form)
        }
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_poll(
    State(store): State<PollStore>,
    State(assets): State<Assets>,
    form: CreatePollForm,
) -> AppResult<(StatusCode, Json<PollView>)> {
    let question = form.question.unwrap_or_default();
    let option_texts = match form.options_texts {
        Some(texts) => texts.decode()?,
        None => Vec::new(),
    };

    // nothing is uploaded for a request that would be rejected anyway
    validate_new_poll(&question, &option_texts)?;

    let logo = assets.resolve_optional(form.logo).await?;
    let option_images = assets.resolve_all(form.option_images).await?;

    let poll = store.create_poll(NewPoll {
        question,
        option_texts,
        logo,
        option_images,
    })?;

    Ok((StatusCode::CREATED, Json(PollView::new(poll, false))))
}
