use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use burrow_core::ShortCode;

/// Resolves a short code and answers with `302 Found`.
pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    // A malformed code can never have been allocated.
    let Ok(code) = ShortCode::new(short_code) else {
        return Err(AppError::NotFound("short code not found".to_string()));
    };

    let Some(url) = state.redirector().resolve(&code).await? else {
        return Err(AppError::NotFound(format!("short code not found: {code}")));
    };

    let location = HeaderValue::try_from(url)
        .map_err(|e| AppError::Internal(format!("stored URL is not a valid header: {e}")))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
