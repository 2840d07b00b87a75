//! Device Farm Protocol Types
//!
//! Wire types for the AWS Device Farm JSON 1.1 API: the entities the lane
//! touches (projects, device pools, uploads, runs), the request/response
//! bodies of the operations it calls, and the service error payload.

pub mod error;
pub mod model;
pub mod ops;

pub use error::{ServiceError, ServiceErrorKind};
pub use model::{
    Counters, DevicePool, Project, Run, RunResult, RunStatus, TestSpec, TestType, Upload, UploadStatus,
    UploadType,
};
pub use ops::Operation;

/// API version prefix used in the `X-Amz-Target` header.
pub const TARGET_PREFIX: &str = "DeviceFarm_20150623";

/// Content type of every JSON 1.1 request body.
pub const JSON_CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Content type announced for uploaded binaries and used for the raw PUT.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Signing name of the service.
pub const SERVICE_NAME: &str = "devicefarm";

/// The only region Device Farm is offered in.
pub const DEFAULT_REGION: &str = "us-west-2";
