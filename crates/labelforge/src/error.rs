use thiserror::Error;

/// Errors raised while building, fitting or querying label models.
#[derive(Debug, Error)]
pub enum LabelModelError {
    /// A caller-supplied input violates a documented precondition.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// An object is in a state that does not allow the requested operation.
    #[error("illegal state: {0}")]
    State(String),

    /// A name, id or index could not be resolved.
    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("model has not been fitted")]
    NotFitted,

    /// The search produced no scorable aggregate.
    #[error("no candidate aggregate: {0}")]
    NoCandidate(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LabelModelError>;

/// Return a [`LabelModelError::Precondition`] unless `cond` holds.
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::LabelModelError::Precondition(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure;
