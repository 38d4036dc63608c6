use serde::{Deserialize, Serialize};

/// Serializable error payload handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code (e.g. "not_found")
    pub error: String,
    /// Human-readable error description
    pub message: String,
}

impl From<&ServiceError> for ErrorResponse {
    fn from(error: &ServiceError) -> Self {
        Self {
            error: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        ServiceError::NotFound(format!("{} with ID {} not found", kind, id))
    }

    pub fn duplicate_id(kind: &str, id: &str) -> Self {
        ServiceError::DuplicateId(format!("{} with ID {} already exists", kind, id))
    }

    /// Stable snake_case code for this error.
    /// This is the single source of truth for error-to-code mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::DuplicateId(_) => "duplicate_id",
            Self::ValidationError(_) => "validation_failed",
            Self::InvalidStatus(_) => "invalid_status",
            Self::Unauthorized(_) => "unauthorized",
            Self::ExportError(_) => "export_failed",
            Self::ConfigError(_) => "config_error",
        }
    }

    /// None of the core errors poison the in-memory state; the caller refreshes
    /// its view and carries on.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::DuplicateId(_)
            | Self::ValidationError(_)
            | Self::InvalidStatus(_)
            | Self::Unauthorized(_)
            | Self::ExportError(_) => true,
            Self::ConfigError(_) => false,
        }
    }
}

/// Builds a single-field `ValidationErrors` the way the derive macro would.
pub(crate) fn field_error(field: &'static str, code: &'static str, message: String) -> ServiceError {
    let mut err = validator::ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, err);
    errors.into()
}
