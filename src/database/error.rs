use serde::Serialize;
use thiserror::Error;

/// Error taxonomy surfaced by every store operation. Each variant carries a
/// human-readable message; [`Error::kind`] exposes the machine-readable kind
/// the transport layer maps onto status codes.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("failed to render document: {0}")]
    Render(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Forbidden,
    Render,
    Database,
}

impl Error {
    pub fn validation(field: &str, message: &str) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::NotFound(message.to_string())
    }

    pub fn conflict(message: &str) -> Self {
        Self::Conflict(message.to_string())
    }

    pub fn forbidden(message: &str) -> Self {
        Self::Forbidden(message.to_string())
    }

    pub fn render(message: String) -> Self {
        Self::Render(message)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Render(_) => ErrorKind::Render,
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Wire form of the error consumed by the transport layer.
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind(),
            "errors": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_kind_and_message() {
        let error = Error::validation("tags", "At least one tag is required");
        let body = error.to_body();

        assert_eq!(body["kind"], "validation");
        assert_eq!(body["errors"], "tags: At least one tag is required");
    }
}
