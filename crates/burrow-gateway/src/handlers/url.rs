use crate::error::{AppError, Result};
use crate::extract::Owner;
use crate::model::{CreateUrlRequest, CreateUrlResponse, UrlSummary};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use burrow_core::{ShortCode, ShortenParams};

pub async fn create_url_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Json(request): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    let mapping = state
        .shortener()
        .shorten(ShortenParams {
            original_url: request.original_url,
            owner,
        })
        .await?;

    let response = CreateUrlResponse {
        short_url: state.short_url(&mapping.code),
        short_code: mapping.code.as_str().to_string(),
        original_url: mapping.original_url,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_urls_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<Vec<UrlSummary>>> {
    let mut mappings = state.shortener().list_by_owner(&owner).await?;
    mappings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let summaries = mappings
        .into_iter()
        .map(|mapping| {
            let short_url = state.short_url(&mapping.code);
            UrlSummary::new(mapping, short_url)
        })
        .collect();
    Ok(Json(summaries))
}

pub async fn delete_url_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<StatusCode> {
    let code = ShortCode::new(short_code)?;

    if state.shortener().delete(&owner, &code).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("short code not found: {code}")))
    }
}
