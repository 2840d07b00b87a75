//! Service error payload.
//!
//! Failed calls return a 4xx/5xx status with a body such as
//! `{"__type": "com.amazonaws.devicefarm#NotFoundException", "message": "..."}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error body returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Fully-qualified exception type.
    #[serde(rename = "__type", default)]
    pub error_type: String,
    /// Human-readable message. The service uses both casings.
    #[serde(alias = "Message", default)]
    pub message: String,
}

/// Coarse classification of [`ServiceError::error_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    NotFound,
    Argument,
    LimitExceeded,
    ServiceAccount,
    IdempotencyMismatch,
    Throttling,
    Authentication,
    Other,
}

impl ServiceError {
    /// Create an error payload.
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Short exception name without the namespace prefix.
    pub fn short_type(&self) -> &str {
        self.error_type
            .rsplit_once('#')
            .map(|(_, name)| name)
            .unwrap_or(&self.error_type)
    }

    /// Classify the exception type.
    pub fn kind(&self) -> ServiceErrorKind {
        match self.short_type() {
            "NotFoundException" => ServiceErrorKind::NotFound,
            "ArgumentException" => ServiceErrorKind::Argument,
            "LimitExceededException" => ServiceErrorKind::LimitExceeded,
            "ServiceAccountException" => ServiceErrorKind::ServiceAccount,
            "IdempotencyException" => ServiceErrorKind::IdempotencyMismatch,
            "ThrottlingException" => ServiceErrorKind::Throttling,
            "UnrecognizedClientException"
            | "InvalidSignatureException"
            | "AccessDeniedException"
            | "ExpiredTokenException" => ServiceErrorKind::Authentication,
            _ => ServiceErrorKind::Other,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.short_type(), self.message)
    }
}

impl std::error::Error for ServiceError {}
