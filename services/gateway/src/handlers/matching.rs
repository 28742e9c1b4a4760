use crate::error::AppError;
use crate::models::MatchForm;
use crate::state::AppState;
use axum::{
    Form,
    extract::{FromRequest, Multipart, Request, State},
    http::header,
};
use types::ids::ConnectionId;

/// Accept a match request and hand it to the matcher.
///
/// Returns as soon as the request is scheduled; the result reaches the
/// client over its WebSocket.
pub async fn submit_match(
    State(state): State<AppState>,
    form: MatchForm,
) -> Result<&'static str, AppError> {
    let requester_id: ConnectionId = form
        .uuid
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid connection id: {:?}", form.uuid)))?;

    if !state.registry.is_connected(requester_id) {
        tracing::debug!(connection_id = %requester_id, "Match request from unregistered connection");
    }

    state.matcher.submit_detached(requester_id, form.price);

    Ok("OK")
}

impl<S> FromRequest<S> for MatchForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<MatchForm>::from_request(req, state)
                .await
                .map_err(|err| AppError::BadRequest(err.body_text()))?;
            return Ok(form);
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?;

        let mut form = MatchForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?
        {
            let slot = match field.name() {
                Some("price") => &mut form.price,
                Some("uuid") => &mut form.uuid,
                _ => continue,
            };
            *slot = field
                .text()
                .await
                .map_err(|err| AppError::BadRequest(err.body_text()))?;
        }

        Ok(form)
    }
}
