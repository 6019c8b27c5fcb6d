use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable reason for a rejected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    MalformedMonthKey,
    MonthOutOfRange,
    NegativeAmount,
    InstallmentsExceedTotal,
    EmptyCustomRecurrence,
    EmptySeasonalMonths,
    ZeroInstallments,
    InvalidClosingDay,
    InvalidDueDay,
    InvalidConfig,
}

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Validation failed for {subject}: {details}")]
    Validation {
        kind: ValidationKind,
        subject: String,
        details: String,
    },

    #[error("Invalid month key '{0}': expected YYYY-MM")]
    InvalidMonthKey(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ProjectionError {
    pub(crate) fn validation(
        kind: ValidationKind,
        subject: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        ProjectionError::Validation {
            kind,
            subject: subject.into(),
            details: details.into(),
        }
    }

    /// The validation kind behind this error, if it came from input checks.
    pub fn kind(&self) -> Option<ValidationKind> {
        match self {
            ProjectionError::Validation { kind, .. } => Some(*kind),
            ProjectionError::InvalidMonthKey(_) => Some(ValidationKind::MalformedMonthKey),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
