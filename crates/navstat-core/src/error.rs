use thiserror::Error;

/// Validation errors for domain values exposed by `navstat-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("isin cannot be empty")]
    EmptyIsin,
    #[error("epoch timestamp {value} is outside the supported calendar range")]
    TimestampOutOfRange { value: i64 },
}
