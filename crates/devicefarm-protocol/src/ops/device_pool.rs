//! ListDevicePools.

use serde::{Deserialize, Serialize};

use crate::model::DevicePool;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDevicePoolsRequest {
    /// Project ARN the pools belong to.
    pub arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDevicePoolsResponse {
    #[serde(default)]
    pub device_pools: Vec<DevicePool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}
