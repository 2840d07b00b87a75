//! Outcome of a Device Farm invocation, printable as one human line or as
//! a JSON summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use devicefarm_protocol::{Counters, DevicePool, Project, Run, RunResult, RunStatus, Upload};

/// Summary schema identifier
pub const SUMMARY_SCHEMA_ID: &str = "mobile-lane/device_farm@1";

/// How far the invocation went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The run was scheduled and not waited on.
    Scheduled,
    /// The run completed with a passing result.
    Completed,
}

/// Successful outcome of `DeviceFarmUploader::run`.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub schema_id: String,
    pub invocation_id: String,
    pub created_at: DateTime<Utc>,
    pub status: OutcomeStatus,
    pub project: String,
    pub project_arn: String,
    pub device_pool: String,
    pub device_pool_arn: String,
    pub app_upload_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_upload_arn: Option<String>,
    pub run_arn: String,
    pub run_status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<Counters>,
}

impl RunOutcome {
    pub(crate) fn new(
        status: OutcomeStatus,
        project: &Project,
        device_pool: &DevicePool,
        app_upload: &Upload,
        test_upload: Option<&Upload>,
        run: Run,
    ) -> Self {
        Self {
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            invocation_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            status,
            project: project.name.clone(),
            project_arn: project.arn.clone(),
            device_pool: device_pool.name.clone(),
            device_pool_arn: device_pool.arn.clone(),
            app_upload_arn: app_upload.arn.clone(),
            test_upload_arn: test_upload.map(|u| u.arn.clone()),
            run_arn: run.arn,
            run_status: run.status,
            result: run.result,
            message: run.message,
            counters: run.counters,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == OutcomeStatus::Completed
    }

    /// One-line human summary
    pub fn to_human(&self) -> String {
        match self.status {
            OutcomeStatus::Scheduled => format!(
                "Successfully scheduled the tests on the AWS device farm (run {})",
                self.run_arn
            ),
            OutcomeStatus::Completed => {
                let result = self.result.map(|r| r.as_str()).unwrap_or("UNKNOWN");
                match &self.counters {
                    Some(c) => format!(
                        "Successfully tested the application on the AWS device farm: {} ({} passed, {} warned of {} tests)",
                        result, c.passed, c.warned, c.total
                    ),
                    None => format!(
                        "Successfully tested the application on the AWS device farm: {}",
                        result
                    ),
                }
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
