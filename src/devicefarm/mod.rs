//! AWS Device Farm action
//!
//! Uploads an application binary (and optionally an instrumentation test
//! package), schedules a run on a device pool and optionally waits for the
//! verdict.

pub mod api;
pub mod artifact;
pub mod error;
pub mod http;
pub mod sigv4;
pub mod summary;
pub mod uploader;

pub use api::{ApiError, ApiResult, ArtifactTransfer, DeviceFarmApi};
pub use artifact::{artifact_type_for, Artifact, ArtifactRole};
pub use error::{DeviceFarmError, DeviceFarmResult, EntityKind};
pub use http::{HttpArtifactTransfer, HttpDeviceFarm};
pub use summary::{OutcomeStatus, RunOutcome, SUMMARY_SCHEMA_ID};
pub use uploader::{find_by_name, test_spec_for, DeviceFarmUploader, UploadConfig};
