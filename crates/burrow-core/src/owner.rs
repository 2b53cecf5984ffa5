use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Longest accepted owner id, in bytes. Matches the width of the storage column.
pub const MAX_OWNER_ID_LEN: usize = 255;

/// Opaque account identifier handed to the core by the identity provider.
///
/// Nothing is assumed about its structure beyond equality and stability.
/// Equality is exact: ids differing only in case or accents are different owners.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidOwner("owner id cannot be empty".to_string()));
        }
        if id.len() > MAX_OWNER_ID_LEN {
            return Err(CoreError::InvalidOwner(format!(
                "owner id is longer than {MAX_OWNER_ID_LEN} bytes"
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
