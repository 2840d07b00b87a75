//! Device Farm entities and their state enumerations.
//!
//! Upload: INITIALIZED → PROCESSING → {SUCCEEDED | FAILED}
//! Run:    PENDING/SCHEDULING/... → RUNNING → COMPLETED (result carries the verdict)
//!
//! Unknown enum values deserialize to an `Unknown` variant so that a new
//! service-side state never breaks decoding of an otherwise valid response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Device Farm project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub arn: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_job_timeout_minutes: Option<u32>,
}

/// A named group of devices, scoped to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePool {
    pub arn: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// CURATED or PRIVATE.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub pool_type: Option<String>,
}

/// Kind of artifact an upload slot receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadType {
    AndroidApp,
    IosApp,
    InstrumentationTestPackage,
    #[serde(other)]
    Unknown,
}

impl UploadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AndroidApp => "ANDROID_APP",
            Self::IosApp => "IOS_APP",
            Self::InstrumentationTestPackage => "INSTRUMENTATION_TEST_PACKAGE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for UploadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing state of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Initialized,
    Processing,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl UploadStatus {
    /// The service is done with the upload, one way or the other.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Initialized | Self::Processing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "INITIALIZED",
            Self::Processing => "PROCESSING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upload slot and its processing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub arn: String,
    pub name: String,
    pub status: UploadStatus,
    #[serde(rename = "type")]
    pub upload_type: UploadType,
    /// Pre-signed destination; only present on the creation response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Service diagnostics, usually set when processing failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Scheduling/execution state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Pending,
    PendingConcurrency,
    PendingDevice,
    Processing,
    Scheduling,
    Preparing,
    Running,
    Completed,
    Stopping,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Only COMPLETED is terminal; a stopped run still ends in COMPLETED.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::PendingConcurrency => "PENDING_CONCURRENCY",
            Self::PendingDevice => "PENDING_DEVICE",
            Self::Processing => "PROCESSING",
            Self::Scheduling => "SCHEDULING",
            Self::Preparing => "PREPARING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Stopping => "STOPPING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunResult {
    Pending,
    Passed,
    Warned,
    Failed,
    Skipped,
    Errored,
    Stopped,
    #[serde(other)]
    Unknown,
}

impl RunResult {
    /// PASSED and WARNED count as a successful run.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed | Self::Warned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Passed => "PASSED",
            Self::Warned => "WARNED",
            Self::Failed => "FAILED",
            Self::Skipped => "SKIPPED",
            Self::Errored => "ERRORED",
            Self::Stopped => "STOPPED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-result test counters reported on a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counters {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub warned: u32,
    pub errored: u32,
    pub stopped: u32,
    pub skipped: u32,
}

/// One execution of a test suite against an app on a device pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counters: Option<Counters>,
}

/// Test type submitted with a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestType {
    BuiltinFuzz,
    Instrumentation,
}

/// Test specification submitted with a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSpec {
    #[serde(rename = "type")]
    pub test_type: TestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_package_arn: Option<String>,
}

impl TestSpec {
    /// Built-in fuzz test, used when no test package was uploaded.
    pub fn builtin_fuzz() -> Self {
        Self {
            test_type: TestType::BuiltinFuzz,
            test_package_arn: None,
        }
    }

    /// Instrumentation tests from an uploaded test package.
    pub fn instrumentation(test_package_arn: impl Into<String>) -> Self {
        Self {
            test_type: TestType::Instrumentation,
            test_package_arn: Some(test_package_arn.into()),
        }
    }
}
