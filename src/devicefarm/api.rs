//! Client seams for the Device Farm workflow.
//!
//! `DeviceFarmApi` covers the request/response API and `ArtifactTransfer`
//! the raw PUT to a pre-signed upload URL. The uploader only sees these
//! traits, so tests drive it with in-process doubles (see `crate::mock`).

use devicefarm_protocol::{
    DevicePool, Operation, Project, Run, ServiceError, ServiceErrorKind, TestSpec, Upload, UploadType,
};

/// Device Farm client errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{operation} failed with HTTP {status}: {error}")]
    Service {
        operation: Operation,
        status: u16,
        error: ServiceError,
    },

    #[error("artifact transfer returned HTTP {status}: {body}")]
    Transfer { status: u16, body: String },

    #[error("could not encode {operation} request: {source}")]
    Encode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not decode {operation} response: {source}")]
    Decode {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing AWS credentials: {0}")]
    Credentials(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Classification of a service error; `None` for local and transport failures.
    pub fn service_kind(&self) -> Option<ServiceErrorKind> {
        match self {
            ApiError::Service { error, .. } => Some(error.kind()),
            _ => None,
        }
    }

    /// Credentials missing locally or rejected by the service.
    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Credentials(_))
            || self.service_kind() == Some(ServiceErrorKind::Authentication)
    }

    /// Follow-up advice printed under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        if self.is_authentication() {
            return Some("check AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and AWS_SESSION_TOKEN");
        }
        match self.service_kind()? {
            ServiceErrorKind::Throttling | ServiceErrorKind::LimitExceeded => {
                Some("the service is rate limiting this account; rerun later")
            }
            ServiceErrorKind::ServiceAccount => {
                Some("the AWS account is not set up for Device Farm")
            }
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// The Device Farm operations the lane depends on.
///
/// List operations return every page.
pub trait DeviceFarmApi: Send + Sync {
    fn list_projects(&self) -> ApiResult<Vec<Project>>;

    fn list_device_pools(&self, project_arn: &str) -> ApiResult<Vec<DevicePool>>;

    /// Create an upload slot; the returned upload carries the one-time URL.
    fn create_upload(
        &self,
        project_arn: &str,
        name: &str,
        content_type: &str,
        upload_type: UploadType,
    ) -> ApiResult<Upload>;

    fn get_upload(&self, arn: &str) -> ApiResult<Upload>;

    fn schedule_run(
        &self,
        project_arn: &str,
        app_arn: &str,
        device_pool_arn: &str,
        test: &TestSpec,
    ) -> ApiResult<Run>;

    fn get_run(&self, arn: &str) -> ApiResult<Run>;
}

/// Raw object-storage transfer to a pre-signed URL.
pub trait ArtifactTransfer: Send + Sync {
    /// PUT the whole payload in one request.
    fn put(&self, url: &str, content_type: &str, body: Vec<u8>) -> ApiResult<()>;
}
