//! Operation-specific request and response bodies.

pub mod device_pool;
pub mod project;
pub mod run;
pub mod upload;

pub use device_pool::{ListDevicePoolsRequest, ListDevicePoolsResponse};
pub use project::{ListProjectsRequest, ListProjectsResponse};
pub use run::{GetRunRequest, GetRunResponse, ScheduleRunRequest, ScheduleRunResponse};
pub use upload::{CreateUploadRequest, CreateUploadResponse, GetUploadRequest, GetUploadResponse};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The API operations used by the lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    ListProjects,
    ListDevicePools,
    CreateUpload,
    GetUpload,
    ScheduleRun,
    GetRun,
}

impl Operation {
    /// Operation name as it appears after the target prefix.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListProjects => "ListProjects",
            Self::ListDevicePools => "ListDevicePools",
            Self::CreateUpload => "CreateUpload",
            Self::GetUpload => "GetUpload",
            Self::ScheduleRun => "ScheduleRun",
            Self::GetRun => "GetRun",
        }
    }

    /// Value of the `X-Amz-Target` header.
    pub fn target(&self) -> String {
        format!("{}.{}", crate::TARGET_PREFIX, self.name())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_header() {
        assert_eq!(
            Operation::ScheduleRun.target(),
            "DeviceFarm_20150623.ScheduleRun"
        );
    }
}
