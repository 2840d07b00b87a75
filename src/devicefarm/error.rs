//! Device Farm workflow errors.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use devicefarm_protocol::{RunResult, UploadStatus};

use super::api::ApiError;
use super::artifact::ArtifactRole;
use crate::poll::PollError;

/// Remote entity looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    DevicePool,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Project => f.write_str("Project"),
            EntityKind::DevicePool => f.write_str("Device pool"),
        }
    }
}

/// Errors that abort a Device Farm run. None are retried.
#[derive(Debug, thiserror::Error)]
pub enum DeviceFarmError {
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    #[error("{role} upload failed with status {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    UploadFailed {
        role: ArtifactRole,
        status: UploadStatus,
        message: Option<String>,
    },

    #[error("run finished with result {result}: {message}")]
    RunFailed { result: RunResult, message: String },

    #[error("Device Farm API error: {0}")]
    Api(#[from] ApiError),

    #[error("{role} not found at path '{}'", .path.display())]
    MissingBinary { role: ArtifactRole, path: PathBuf },

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("upload slot {0} came back without a destination URL")]
    MissingUploadUrl(String),

    #[error("timed out waiting for {what} after {}s", .waited.as_secs())]
    Timeout { what: String, waited: Duration },
}

impl DeviceFarmError {
    /// Exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            DeviceFarmError::NotFound { .. } => 10,
            DeviceFarmError::UploadFailed { .. } => 20,
            DeviceFarmError::RunFailed { .. } => 30,
            DeviceFarmError::Api(e) if e.is_authentication() => 41,
            DeviceFarmError::Api(_) => 40,
            DeviceFarmError::MissingUploadUrl(_) => 40,
            DeviceFarmError::MissingBinary { .. } => 1,
            DeviceFarmError::Io { .. } => 1,
            DeviceFarmError::Timeout { .. } => 80,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            DeviceFarmError::Api(e) => e.hint(),
            _ => None,
        }
    }

    pub(crate) fn from_poll(error: PollError<ApiError>, what: impl Into<String>) -> Self {
        match error {
            PollError::Fetch(e) => DeviceFarmError::Api(e),
            PollError::Timeout { waited, .. } => DeviceFarmError::Timeout {
                what: what.into(),
                waited,
            },
        }
    }
}

/// Result type for the workflow
pub type DeviceFarmResult<T> = Result<T, DeviceFarmError>;
