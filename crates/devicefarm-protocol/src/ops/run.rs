//! ScheduleRun and GetRun.

use serde::{Deserialize, Serialize};

use crate::model::{Run, TestSpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRunRequest {
    pub project_arn: String,
    pub app_arn: String,
    pub device_pool_arn: String,
    pub test: TestSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRunResponse {
    pub run: Run,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRunRequest {
    pub arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRunResponse {
    pub run: Run,
}
