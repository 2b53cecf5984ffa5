use crate::{Generator, GeneratorError};
use burrow_core::shortcode::SHORT_CODE_LENGTH;
use burrow_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

/// A short code generator using a sequential counter.
///
/// This generator produces sequential codes like "wh000000", "wh000001", etc.,
/// zero-padding the counter so every code has the fixed short-code length.
/// Codes are unique within a single instance; for several nodes, give each
/// node its own prefix. Once the counter no longer fits, `generate` fails.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a generator starting from a specific counter value.
    ///
    /// Useful for resuming from a known state or distributing
    /// counter ranges across nodes.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        let width = SHORT_CODE_LENGTH.saturating_sub(self.prefix.len());
        let code = format!("{}{:0width$}", self.prefix, count, width = width);
        ShortCode::new(code).map_err(|e| GeneratorError::Unavailable(e.to_string()))
    }
}
