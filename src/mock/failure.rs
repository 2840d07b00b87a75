//! Failure injection for the mock Device Farm
//!
//! Lets tests make a given operation return a service error, optionally
//! only for its first N calls.

use std::collections::HashMap;

use devicefarm_protocol::{Operation, ServiceError};

use crate::devicefarm::ApiError;

/// Failure returned for an operation
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Exception type, e.g. `ArgumentException`
    pub error_type: String,
    pub message: String,
    /// HTTP status reported with the error
    pub status: u16,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Client error with the given exception type
    pub fn error(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
            status: 400,
            fail_count: None,
        }
    }

    pub fn throttling() -> Self {
        Self::error("ThrottlingException", "Rate exceeded")
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            ..Self::error("ServiceException", message)
        }
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }

    pub fn to_api_error(&self, operation: Operation) -> ApiError {
        ApiError::Service {
            operation,
            status: self.status,
            error: ServiceError::new(
                format!("com.amazonaws.devicefarm#{}", self.error_type),
                self.message.clone(),
            ),
        }
    }
}

/// Per-operation failure table
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<Operation, FailureConfig>,
    call_counts: HashMap<Operation, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, op: Operation, config: FailureConfig) {
        self.configs.insert(op, config);
        self.call_counts.insert(op, 0);
    }

    pub fn inject_error(&mut self, op: Operation, error_type: impl Into<String>, message: impl Into<String>) {
        self.inject(op, FailureConfig::error(error_type, message));
    }

    pub fn clear(&mut self) {
        self.configs.clear();
        self.call_counts.clear();
    }

    pub fn clear_op(&mut self, op: Operation) {
        self.configs.remove(&op);
        self.call_counts.remove(&op);
    }

    /// Returns the error to raise for this call, if any.
    pub fn check(&mut self, op: Operation) -> Option<ApiError> {
        let config = self.configs.get(&op)?;
        let count = self.call_counts.entry(op).or_insert(0);
        *count += 1;

        if let Some(fail_limit) = config.fail_count {
            if *count > fail_limit {
                return None;
            }
        }
        Some(config.to_api_error(op))
    }
}
