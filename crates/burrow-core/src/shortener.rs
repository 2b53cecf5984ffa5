use crate::model::Mapping;
use crate::owner::OwnerId;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// The account that will own the mapping.
    pub owner: OwnerId,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Allocates a fresh short code for the URL and stores the mapping.
    async fn shorten(&self, params: ShortenParams) -> Result<Mapping>;

    /// Looks up a mapping by its short code. Has no side effects.
    async fn lookup(&self, code: &ShortCode) -> Result<Option<Mapping>>;

    /// Lists every mapping owned by the account.
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<Mapping>>;

    /// Deletes a mapping owned by `owner`.
    /// Returns `false` if the code does not exist or belongs to someone else.
    async fn delete(&self, owner: &OwnerId, code: &ShortCode) -> Result<bool>;
}
