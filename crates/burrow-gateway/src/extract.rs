use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use burrow_core::OwnerId;

use crate::error::AppError;

/// Header carrying the opaque account identifier of the caller.
pub const OWNER_HEADER: &str = "x-owner-id";

/// The authenticated account making the request.
#[derive(Debug, Clone)]
pub struct Owner(pub OwnerId);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(OWNER_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {OWNER_HEADER} header")))?;

        let raw = value
            .to_str()
            .map_err(|_| AppError::Unauthorized(format!("{OWNER_HEADER} is not valid text")))?;

        OwnerId::new(raw)
            .map(Owner)
            .map_err(|e| AppError::Unauthorized(e.to_string()))
    }
}
