use thiserror::Error;

/// Input-validation failures raised by the projection engine.
///
/// Every variant is detected before any computation starts, so an `Err`
/// never comes with a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("{field}: {detail}")]
    InvalidAmount { field: &'static str, detail: String },
    #[error("{field}: {detail}")]
    InvalidHorizon { field: &'static str, detail: String },
    #[error("riskTier: unknown risk tier '{0}', expected one of Low, Medium, High")]
    InvalidTier(String),
    #[error("{field}: {detail}")]
    InvalidRate { field: &'static str, detail: String },
}

impl EngineError {
    pub fn field(&self) -> &'static str {
        match self {
            EngineError::InvalidAmount { field, .. }
            | EngineError::InvalidHorizon { field, .. }
            | EngineError::InvalidRate { field, .. } => *field,
            EngineError::InvalidTier(_) => "riskTier",
        }
    }

    pub(crate) fn amount(field: &'static str, detail: impl Into<String>) -> Self {
        EngineError::InvalidAmount {
            field,
            detail: detail.into(),
        }
    }

    pub(crate) fn horizon(field: &'static str, detail: impl Into<String>) -> Self {
        EngineError::InvalidHorizon {
            field,
            detail: detail.into(),
        }
    }

    pub(crate) fn rate(field: &'static str, detail: impl Into<String>) -> Self {
        EngineError::InvalidRate {
            field,
            detail: detail.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
