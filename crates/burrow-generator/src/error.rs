use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    /// The randomness source (or generator configuration) cannot produce codes.
    #[error("code generation unavailable: {0}")]
    Unavailable(String),
}
