//! Production clients: signed JSON 1.1 calls to Device Farm and the raw
//! PUT to S3 pre-signed URLs, both over a blocking `reqwest` client.

use chrono::Utc;
use reqwest::blocking::Client as BlockingClient;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use devicefarm_protocol::ops::{
    CreateUploadRequest, CreateUploadResponse, GetRunRequest, GetRunResponse, GetUploadRequest,
    GetUploadResponse, ListDevicePoolsRequest, ListDevicePoolsResponse, ListProjectsRequest,
    ListProjectsResponse, ScheduleRunRequest, ScheduleRunResponse,
};
use devicefarm_protocol::{
    DevicePool, Operation, Project, Run, ServiceError, TestSpec, Upload, UploadType,
    JSON_CONTENT_TYPE, SERVICE_NAME,
};

use super::api::{ApiError, ApiResult, ArtifactTransfer, DeviceFarmApi};
use super::sigv4::{self, Credentials, RequestToSign};
use crate::config::DeviceFarmSettings;

fn build_http(settings: &DeviceFarmSettings) -> ApiResult<BlockingClient> {
    Ok(BlockingClient::builder()
        .timeout(settings.http_timeout)
        .build()?)
}

/// Device Farm API client
pub struct HttpDeviceFarm {
    http: BlockingClient,
    endpoint: Url,
    host: String,
    region: String,
    credentials: Credentials,
}

impl HttpDeviceFarm {
    pub fn new(settings: &DeviceFarmSettings, credentials: Credentials) -> ApiResult<Self> {
        let endpoint_url = settings.endpoint_url();
        let endpoint =
            Url::parse(&endpoint_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint_url, e)))?;
        let host = host_header(&endpoint)?;

        debug!(endpoint = %endpoint, region = %settings.region, "Device Farm client created");

        Ok(Self {
            http: build_http(settings)?,
            endpoint,
            host,
            region: settings.region.clone(),
            credentials,
        })
    }

    /// Build a client with credentials from the environment.
    pub fn from_env(settings: &DeviceFarmSettings) -> ApiResult<Self> {
        Self::new(settings, Credentials::from_env()?)
    }

    fn call<Req, Resp>(&self, operation: Operation, request: &Req) -> ApiResult<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)
            .map_err(|source| ApiError::Encode { operation, source })?;
        let target = operation.target();

        let signed = sigv4::sign(
            &RequestToSign {
                host: &self.host,
                content_type: JSON_CONTENT_TYPE,
                target: &target,
                body: &body,
            },
            &self.credentials,
            &self.region,
            SERVICE_NAME,
            Utc::now(),
        );

        trace!(%operation, bytes = body.len(), "sending request");

        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header("x-amz-target", &target)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization);
        if let Some(token) = &signed.security_token {
            builder = builder.header("x-amz-security-token", token);
        }

        let response = builder.body(body).send()?;
        let status = response.status();
        let bytes = response.bytes()?;

        if !status.is_success() {
            let error = serde_json::from_slice::<ServiceError>(&bytes).unwrap_or_else(|_| {
                ServiceError::new("HttpError", String::from_utf8_lossy(&bytes).trim())
            });
            return Err(ApiError::Service {
                operation,
                status: status.as_u16(),
                error,
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { operation, source })
    }
}

/// Host header value as the HTTP client will send it.
fn host_header(url: &Url) -> ApiResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| ApiError::InvalidUrl(format!("{} has no host", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

impl DeviceFarmApi for HttpDeviceFarm {
    fn list_projects(&self) -> ApiResult<Vec<Project>> {
        let mut projects = Vec::new();
        let mut next_token = None;
        loop {
            let page: ListProjectsResponse =
                self.call(Operation::ListProjects, &ListProjectsRequest { next_token })?;
            projects.extend(page.projects);
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(projects),
            }
        }
    }

    fn list_device_pools(&self, project_arn: &str) -> ApiResult<Vec<DevicePool>> {
        let mut pools = Vec::new();
        let mut next_token = None;
        loop {
            let request = ListDevicePoolsRequest {
                arn: project_arn.to_string(),
                next_token,
            };
            let page: ListDevicePoolsResponse = self.call(Operation::ListDevicePools, &request)?;
            pools.extend(page.device_pools);
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => return Ok(pools),
            }
        }
    }

    fn create_upload(
        &self,
        project_arn: &str,
        name: &str,
        content_type: &str,
        upload_type: UploadType,
    ) -> ApiResult<Upload> {
        let request = CreateUploadRequest {
            project_arn: project_arn.to_string(),
            name: name.to_string(),
            upload_type,
            content_type: content_type.to_string(),
        };
        let response: CreateUploadResponse = self.call(Operation::CreateUpload, &request)?;
        Ok(response.upload)
    }

    fn get_upload(&self, arn: &str) -> ApiResult<Upload> {
        let request = GetUploadRequest {
            arn: arn.to_string(),
        };
        let response: GetUploadResponse = self.call(Operation::GetUpload, &request)?;
        Ok(response.upload)
    }

    fn schedule_run(
        &self,
        project_arn: &str,
        app_arn: &str,
        device_pool_arn: &str,
        test: &TestSpec,
    ) -> ApiResult<Run> {
        let request = ScheduleRunRequest {
            project_arn: project_arn.to_string(),
            app_arn: app_arn.to_string(),
            device_pool_arn: device_pool_arn.to_string(),
            test: test.clone(),
        };
        let response: ScheduleRunResponse = self.call(Operation::ScheduleRun, &request)?;
        Ok(response.run)
    }

    fn get_run(&self, arn: &str) -> ApiResult<Run> {
        let request = GetRunRequest {
            arn: arn.to_string(),
        };
        let response: GetRunResponse = self.call(Operation::GetRun, &request)?;
        Ok(response.run)
    }
}

/// PUT to a pre-signed URL
pub struct HttpArtifactTransfer {
    http: BlockingClient,
}

impl HttpArtifactTransfer {
    pub fn new(settings: &DeviceFarmSettings) -> ApiResult<Self> {
        Ok(Self {
            http: build_http(settings)?,
        })
    }
}

impl ArtifactTransfer for HttpArtifactTransfer {
    fn put(&self, url: &str, content_type: &str, body: Vec<u8>) -> ApiResult<()> {
        debug!(bytes = body.len(), "PUT artifact to pre-signed URL");

        let response = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Transfer {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
