//! In-process Device Farm and object storage doubles.

use std::sync::{Arc, Mutex};

use devicefarm_protocol::{
    DevicePool, Operation, Project, Run, RunResult, ServiceError, TestSpec, Upload, UploadStatus,
    UploadType,
};

use super::failure::{FailureConfig, FailureInjector};
use super::state::{advance, ApiCall, MockState, RunStep, TrackedUpload, UploadScript};
use crate::devicefarm::{ApiError, ApiResult, ArtifactTransfer, DeviceFarmApi};

fn not_found(operation: Operation, what: &str) -> ApiError {
    ApiError::Service {
        operation,
        status: 400,
        error: ServiceError::new(
            "com.amazonaws.devicefarm#NotFoundException",
            format!("{} was not found", what),
        ),
    }
}

/// Scriptable Device Farm that records every call.
#[derive(Clone, Default)]
pub struct MockDeviceFarm {
    state: Arc<Mutex<MockState>>,
    failures: Arc<Mutex<FailureInjector>>,
}

impl MockDeviceFarm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock holding one project with one device pool
    pub fn with_project_and_pool(project: &str, pool: &str) -> Self {
        let mock = Self::new();
        let project = mock.add_project(project);
        mock.add_device_pool(&project.arn, pool);
        mock
    }

    pub fn add_project(&self, name: &str) -> Project {
        let mut state = self.state.lock().unwrap();
        let project = Project {
            arn: state.next_arn("project"),
            name: name.to_string(),
            default_job_timeout_minutes: Some(150),
        };
        state.projects.push(project.clone());
        project
    }

    pub fn add_device_pool(&self, project_arn: &str, name: &str) -> DevicePool {
        let mut state = self.state.lock().unwrap();
        let pool = DevicePool {
            arn: state.next_arn("devicepool"),
            name: name.to_string(),
            description: None,
            pool_type: Some("PRIVATE".to_string()),
        };
        state
            .pools
            .entry(project_arn.to_string())
            .or_default()
            .push(pool.clone());
        pool
    }

    /// Progression for uploads of this type created from now on
    pub fn script_upload(&self, upload_type: UploadType, script: UploadScript) {
        self.state
            .lock()
            .unwrap()
            .upload_scripts
            .insert(upload_type, script);
    }

    /// Progression for runs scheduled from now on
    pub fn script_run(&self, steps: Vec<RunStep>) {
        self.state.lock().unwrap().run_script = steps;
    }

    pub fn inject_failure(&self, op: Operation, config: FailureConfig) {
        self.failures.lock().unwrap().inject(op, config);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: Operation) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.operation() == op)
            .count()
    }

    /// Record the call, then apply any injected failure.
    fn enter(&self, call: ApiCall) -> ApiResult<()> {
        let op = call.operation();
        self.state.lock().unwrap().calls.push(call);
        match self.failures.lock().unwrap().check(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl DeviceFarmApi for MockDeviceFarm {
    fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.enter(ApiCall::ListProjects)?;
        Ok(self.state.lock().unwrap().projects.clone())
    }

    fn list_device_pools(&self, project_arn: &str) -> ApiResult<Vec<DevicePool>> {
        self.enter(ApiCall::ListDevicePools {
            project_arn: project_arn.to_string(),
        })?;
        let state = self.state.lock().unwrap();
        if !state.projects.iter().any(|p| p.arn == project_arn) {
            return Err(not_found(Operation::ListDevicePools, "project"));
        }
        Ok(state.pools.get(project_arn).cloned().unwrap_or_default())
    }

    fn create_upload(
        &self,
        project_arn: &str,
        name: &str,
        content_type: &str,
        upload_type: UploadType,
    ) -> ApiResult<Upload> {
        self.enter(ApiCall::CreateUpload {
            project_arn: project_arn.to_string(),
            name: name.to_string(),
            content_type: content_type.to_string(),
            upload_type,
        })?;

        let mut state = self.state.lock().unwrap();
        let arn = state.next_arn("upload");
        let script = state.upload_script(upload_type);
        let upload = Upload {
            arn: arn.clone(),
            name: name.to_string(),
            status: UploadStatus::Initialized,
            upload_type,
            url: Some(format!("https://mock-storage.local/uploads/{}", arn)),
            content_type: Some(content_type.to_string()),
            message: None,
        };
        state.uploads.insert(
            arn,
            TrackedUpload {
                upload: upload.clone(),
                pending: script.statuses.into(),
                message: script.message,
            },
        );
        Ok(upload)
    }

    fn get_upload(&self, arn: &str) -> ApiResult<Upload> {
        self.enter(ApiCall::GetUpload {
            arn: arn.to_string(),
        })?;

        let mut state = self.state.lock().unwrap();
        let tracked = state
            .uploads
            .get_mut(arn)
            .ok_or_else(|| not_found(Operation::GetUpload, "upload"))?;
        if let Some(status) = advance(&mut tracked.pending) {
            tracked.upload.status = status;
        }
        if tracked.upload.status == UploadStatus::Failed {
            tracked.upload.message = tracked.message.clone();
        }
        let mut upload = tracked.upload.clone();
        upload.url = None;
        Ok(upload)
    }

    fn schedule_run(
        &self,
        project_arn: &str,
        app_arn: &str,
        device_pool_arn: &str,
        test: &TestSpec,
    ) -> ApiResult<Run> {
        self.enter(ApiCall::ScheduleRun {
            project_arn: project_arn.to_string(),
            app_arn: app_arn.to_string(),
            device_pool_arn: device_pool_arn.to_string(),
            test: test.clone(),
        })?;

        let mut state = self.state.lock().unwrap();
        match state.uploads.get(app_arn) {
            Some(app) if app.upload.status == UploadStatus::Succeeded => {}
            _ => {
                return Err(ApiError::Service {
                    operation: Operation::ScheduleRun,
                    status: 400,
                    error: ServiceError::new(
                        "com.amazonaws.devicefarm#ArgumentException",
                        "app upload is not ready",
                    ),
                })
            }
        }
        let arn = state.next_arn("run");
        Ok(state.new_run(arn))
    }

    fn get_run(&self, arn: &str) -> ApiResult<Run> {
        self.enter(ApiCall::GetRun {
            arn: arn.to_string(),
        })?;

        let mut state = self.state.lock().unwrap();
        let tracked = state
            .runs
            .get_mut(arn)
            .ok_or_else(|| not_found(Operation::GetRun, "run"))?;
        if let Some(step) = advance(&mut tracked.pending) {
            tracked.run.status = step.status;
            tracked.run.result = step.result;
            tracked.run.message = step.message;
            if let (Some(counters), Some(result)) = (tracked.run.counters.as_mut(), step.result) {
                counters.total = 1;
                counters.passed = u32::from(result == RunResult::Passed);
                counters.warned = u32::from(result == RunResult::Warned);
                counters.failed = u32::from(result == RunResult::Failed);
            }
        }
        Ok(tracked.run.clone())
    }
}

/// One recorded PUT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub url: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Object storage double that records PUTs.
#[derive(Clone, Default)]
pub struct MockTransfer {
    puts: Arc<Mutex<Vec<RecordedPut>>>,
    fail_status: Arc<Mutex<Option<u16>>>,
}

impl MockTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every PUT with this HTTP status.
    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }
}

impl ArtifactTransfer for MockTransfer {
    fn put(&self, url: &str, content_type: &str, body: Vec<u8>) -> ApiResult<()> {
        self.puts.lock().unwrap().push(RecordedPut {
            url: url.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        if let Some(status) = *self.fail_status.lock().unwrap() {
            return Err(ApiError::Transfer {
                status,
                body: "<Error><Code>AccessDenied</Code></Error>".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicefarm_protocol::{RunStatus, OCTET_STREAM};

    #[test]
    fn test_upload_progression() {
        let mock = MockDeviceFarm::with_project_and_pool("MyApp", "TopDevices");
        let project = mock.list_projects().unwrap().remove(0);

        let upload = mock
            .create_upload(&project.arn, "app.apk", OCTET_STREAM, UploadType::AndroidApp)
            .unwrap();
        assert_eq!(upload.status, UploadStatus::Initialized);
        assert!(upload.url.is_some());

        assert_eq!(mock.get_upload(&upload.arn).unwrap().status, UploadStatus::Processing);
        assert_eq!(mock.get_upload(&upload.arn).unwrap().status, UploadStatus::Succeeded);
        assert_eq!(mock.get_upload(&upload.arn).unwrap().status, UploadStatus::Succeeded);
    }

    #[test]
    fn test_failed_upload_carries_message() {
        let mock = MockDeviceFarm::with_project_and_pool("MyApp", "TopDevices");
        mock.script_upload(UploadType::IosApp, UploadScript::fails("invalid ipa"));
        let project = mock.list_projects().unwrap().remove(0);

        let upload = mock
            .create_upload(&project.arn, "app.ipa", OCTET_STREAM, UploadType::IosApp)
            .unwrap();
        mock.get_upload(&upload.arn).unwrap();
        let done = mock.get_upload(&upload.arn).unwrap();
        assert_eq!(done.status, UploadStatus::Failed);
        assert_eq!(done.message.as_deref(), Some("invalid ipa"));
    }

    #[test]
    fn test_schedule_requires_succeeded_app() {
        let mock = MockDeviceFarm::with_project_and_pool("MyApp", "TopDevices");
        let project = mock.list_projects().unwrap().remove(0);
        let pool = mock.list_device_pools(&project.arn).unwrap().remove(0);
        let upload = mock
            .create_upload(&project.arn, "app.apk", OCTET_STREAM, UploadType::AndroidApp)
            .unwrap();

        let err = mock
            .schedule_run(&project.arn, &upload.arn, &pool.arn, &TestSpec::builtin_fuzz())
            .unwrap_err();
        assert!(err.to_string().contains("not ready"));
    }

    #[test]
    fn test_run_progression() {
        let mock = MockDeviceFarm::with_project_and_pool("MyApp", "TopDevices");
        mock.script_run(vec![
            RunStep::running(),
            RunStep::completed(RunResult::Failed).with_message("2 tests failed"),
        ]);
        let project = mock.list_projects().unwrap().remove(0);
        let pool = mock.list_device_pools(&project.arn).unwrap().remove(0);
        let upload = mock
            .create_upload(&project.arn, "app.apk", OCTET_STREAM, UploadType::AndroidApp)
            .unwrap();
        mock.get_upload(&upload.arn).unwrap();
        mock.get_upload(&upload.arn).unwrap();

        let run = mock
            .schedule_run(&project.arn, &upload.arn, &pool.arn, &TestSpec::builtin_fuzz())
            .unwrap();
        assert_eq!(run.status, RunStatus::Scheduling);
        assert_eq!(mock.get_run(&run.arn).unwrap().status, RunStatus::Running);

        let done = mock.get_run(&run.arn).unwrap();
        assert_eq!(done.status, RunStatus::Completed);
        assert_eq!(done.result, Some(RunResult::Failed));
        assert_eq!(done.message.as_deref(), Some("2 tests failed"));
        assert_eq!(done.counters.unwrap().failed, 1);
    }

    #[test]
    fn test_calls_are_recorded() {
        let mock = MockDeviceFarm::with_project_and_pool("MyApp", "TopDevices");
        mock.list_projects().unwrap();
        assert_eq!(mock.calls(), vec![ApiCall::ListProjects]);
        assert_eq!(mock.call_count(Operation::ListProjects), 1);
        assert_eq!(mock.call_count(Operation::GetRun), 0);
    }

    #[test]
    fn test_injected_failure_is_recorded() {
        let mock = MockDeviceFarm::new();
        mock.inject_failure(Operation::ListProjects, FailureConfig::throttling());
        assert!(mock.list_projects().is_err());
        assert_eq!(mock.call_count(Operation::ListProjects), 1);

        mock.clear_failures();
        assert!(mock.list_projects().unwrap().is_empty());
    }

    #[test]
    fn test_transfer_records_and_fails() {
        let transfer = MockTransfer::new();
        transfer.put("https://s3/x", OCTET_STREAM, b"abc".to_vec()).unwrap();
        transfer.fail_with(403);
        assert!(matches!(
            transfer.put("https://s3/y", OCTET_STREAM, vec![]),
            Err(ApiError::Transfer { status: 403, .. })
        ));

        let puts = transfer.puts();
        assert_eq!(puts.len(), 2);
        assert_eq!(puts[0].body, b"abc");
    }
}
