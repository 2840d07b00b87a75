//! The Device Farm upload-and-run pipeline.
//!
//! resolve project → resolve pool → create + PUT app upload →
//! [create + PUT + await test upload] → await app upload → schedule run →
//! [await run and classify its result]
//!
//! Every step is blocking and runs once; the first error aborts the whole
//! invocation with no cleanup of what was already created.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use devicefarm_protocol::{
    DevicePool, Project, Run, RunResult, TestSpec, Upload, UploadStatus, OCTET_STREAM,
};

use super::api::{ArtifactTransfer, DeviceFarmApi};
use super::artifact::{Artifact, ArtifactRole};
use super::error::{DeviceFarmError, DeviceFarmResult, EntityKind};
use super::summary::{OutcomeStatus, RunOutcome};
use crate::poll::{poll_until, PollPolicy};

/// Inputs of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub project_name: String,
    pub device_pool_name: String,
    pub binary_path: PathBuf,
    pub test_binary_path: Option<PathBuf>,
    pub wait_for_completion: bool,
}

impl UploadConfig {
    /// Check that the binaries exist before anything remote happens.
    pub fn validate(&self) -> DeviceFarmResult<()> {
        if !self.binary_path.is_file() {
            return Err(DeviceFarmError::MissingBinary {
                role: ArtifactRole::Application,
                path: self.binary_path.clone(),
            });
        }
        if let Some(path) = &self.test_binary_path {
            if !path.is_file() {
                return Err(DeviceFarmError::MissingBinary {
                    role: ArtifactRole::TestPackage,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Linear scan for an exact name match.
pub fn find_by_name<'a, T>(items: &'a [T], name: &str, name_of: impl Fn(&T) -> &str) -> Option<&'a T> {
    items.iter().find(|item| name_of(item) == name)
}

/// Test specification for the run: instrumentation when a test package
/// was uploaded, the built-in fuzzer otherwise.
pub fn test_spec_for(test_upload: Option<&Upload>) -> TestSpec {
    match test_upload {
        Some(upload) => TestSpec::instrumentation(upload.arn.clone()),
        None => TestSpec::builtin_fuzz(),
    }
}

/// Drives one upload-and-run cycle against an injected client.
pub struct DeviceFarmUploader {
    api: Arc<dyn DeviceFarmApi>,
    transfer: Arc<dyn ArtifactTransfer>,
    policy: PollPolicy,
}

impl DeviceFarmUploader {
    /// Uploader with the default 10 second unbounded polling
    pub fn new(api: Arc<dyn DeviceFarmApi>, transfer: Arc<dyn ArtifactTransfer>) -> Self {
        Self::with_policy(api, transfer, PollPolicy::default())
    }

    pub fn with_policy(
        api: Arc<dyn DeviceFarmApi>,
        transfer: Arc<dyn ArtifactTransfer>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            api,
            transfer,
            policy,
        }
    }

    pub fn run(&self, config: &UploadConfig) -> DeviceFarmResult<RunOutcome> {
        info!("Preparing the upload to the device farm");

        let project = self.resolve_project(&config.project_name)?;
        let device_pool = self.resolve_device_pool(&project, &config.device_pool_name)?;

        let app = Artifact::application(&config.binary_path);
        let app_upload = self.create_upload(&project, &app)?;
        info!(name = %app.name, upload_type = %app.upload_type, "Uploading the application binary");
        self.transfer(&app_upload, &app)?;

        let test_upload = match &config.test_binary_path {
            Some(path) => {
                let test = Artifact::test_package(path);
                let slot = self.create_upload(&project, &test)?;
                info!(name = %test.name, "Uploading the test binary");
                self.transfer(&slot, &test)?;

                info!("Waiting for the test upload to succeed");
                Some(self.wait_for_upload(&slot, ArtifactRole::TestPackage)?)
            }
            None => None,
        };

        info!("Waiting for the application upload to succeed");
        let app_upload = self.wait_for_upload(&app_upload, ArtifactRole::Application)?;

        let test_spec = test_spec_for(test_upload.as_ref());
        let run = self
            .api
            .schedule_run(&project.arn, &app_upload.arn, &device_pool.arn, &test_spec)?;
        info!(run_arn = %run.arn, test_type = ?test_spec.test_type, "Scheduled run");

        if !config.wait_for_completion {
            info!("Successfully scheduled the tests on the AWS device farm");
            return Ok(RunOutcome::new(
                OutcomeStatus::Scheduled,
                &project,
                &device_pool,
                &app_upload,
                test_upload.as_ref(),
                run,
            ));
        }

        info!("Waiting for the run to complete");
        let run = self.wait_for_run(&run)?;
        let result = run.result.unwrap_or(RunResult::Unknown);
        info!(%result, "The run ended with result {}", result);

        if !result.is_success() {
            let message = run
                .message
                .clone()
                .unwrap_or_else(|| format!("run ended with result {}", result));
            return Err(DeviceFarmError::RunFailed { result, message });
        }

        info!("Successfully tested the application on the AWS device farm");
        Ok(RunOutcome::new(
            OutcomeStatus::Completed,
            &project,
            &device_pool,
            &app_upload,
            test_upload.as_ref(),
            run,
        ))
    }

    fn resolve_project(&self, name: &str) -> DeviceFarmResult<Project> {
        let projects = self.api.list_projects()?;
        debug!(count = projects.len(), "listed projects");
        find_by_name(&projects, name, |p| p.name.as_str())
            .cloned()
            .ok_or_else(|| DeviceFarmError::NotFound {
                kind: EntityKind::Project,
                name: name.to_string(),
            })
    }

    fn resolve_device_pool(&self, project: &Project, name: &str) -> DeviceFarmResult<DevicePool> {
        let pools = self.api.list_device_pools(&project.arn)?;
        debug!(count = pools.len(), project = %project.name, "listed device pools");
        find_by_name(&pools, name, |p| p.name.as_str())
            .cloned()
            .ok_or_else(|| DeviceFarmError::NotFound {
                kind: EntityKind::DevicePool,
                name: name.to_string(),
            })
    }

    fn create_upload(&self, project: &Project, artifact: &Artifact) -> DeviceFarmResult<Upload> {
        let upload =
            self.api
                .create_upload(&project.arn, &artifact.name, OCTET_STREAM, artifact.upload_type)?;
        debug!(arn = %upload.arn, upload_type = %artifact.upload_type, "created upload slot");
        Ok(upload)
    }

    /// Read the artifact and PUT it to the slot's one-time URL.
    fn transfer(&self, upload: &Upload, artifact: &Artifact) -> DeviceFarmResult<()> {
        let url = upload
            .url
            .as_deref()
            .ok_or_else(|| DeviceFarmError::MissingUploadUrl(upload.arn.clone()))?;
        let body = artifact.read().map_err(|source| DeviceFarmError::Io {
            path: artifact.path.clone(),
            source,
        })?;
        self.transfer.put(url, OCTET_STREAM, body)?;
        Ok(())
    }

    fn wait_for_upload(&self, upload: &Upload, role: ArtifactRole) -> DeviceFarmResult<Upload> {
        let upload = poll_until(
            &self.policy,
            || self.api.get_upload(&upload.arn),
            |u| u.status.is_terminal(),
        )
        .map_err(|e| DeviceFarmError::from_poll(e, format!("{} upload {}", role, upload.arn)))?;

        if upload.status != UploadStatus::Succeeded {
            return Err(DeviceFarmError::UploadFailed {
                role,
                status: upload.status,
                message: upload.message,
            });
        }
        Ok(upload)
    }

    fn wait_for_run(&self, run: &Run) -> DeviceFarmResult<Run> {
        poll_until(
            &self.policy,
            || self.api.get_run(&run.arn),
            |r| r.status.is_terminal(),
        )
        .map_err(|e| DeviceFarmError::from_poll(e, format!("run {}", run.arn)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devicefarm_protocol::{TestType, UploadType};

    fn upload(arn: &str) -> Upload {
        Upload {
            arn: arn.to_string(),
            name: "tests.apk".to_string(),
            status: UploadStatus::Succeeded,
            upload_type: UploadType::InstrumentationTestPackage,
            url: None,
            content_type: None,
            message: None,
        }
    }

    #[test]
    fn test_spec_without_test_package() {
        assert_eq!(test_spec_for(None), TestSpec::builtin_fuzz());
    }

    #[test]
    fn test_spec_with_test_package() {
        let spec = test_spec_for(Some(&upload("arn:tests")));
        assert_eq!(spec.test_type, TestType::Instrumentation);
        assert_eq!(spec.test_package_arn.as_deref(), Some("arn:tests"));
    }

    #[test]
    fn test_find_by_name_is_exact() {
        let names = vec!["MyApp".to_string(), "MyApp Staging".to_string()];
        assert_eq!(find_by_name(&names, "MyApp", |s| s.as_str()), Some(&names[0]));
        assert_eq!(find_by_name(&names, "myapp", |s| s.as_str()), None);
        assert_eq!(find_by_name(&names, "MyApp Stag", |s| s.as_str()), None);
    }

    #[test]
    fn test_validate_missing_binary() {
        let config = UploadConfig {
            project_name: "MyApp".to_string(),
            device_pool_name: "TopDevices".to_string(),
            binary_path: PathBuf::from("/nonexistent/app.apk"),
            test_binary_path: None,
            wait_for_completion: true,
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            DeviceFarmError::MissingBinary { role: ArtifactRole::Application, .. }
        ));
        assert!(err.to_string().contains("application binary not found"));
    }

    #[test]
    fn test_validate_missing_test_binary() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app.apk");
        std::fs::write(&app, b"apk").unwrap();

        let config = UploadConfig {
            project_name: "MyApp".to_string(),
            device_pool_name: "TopDevices".to_string(),
            binary_path: app,
            test_binary_path: Some(dir.path().join("missing-tests.apk")),
            wait_for_completion: true,
        };
        assert!(matches!(
            config.validate(),
            Err(DeviceFarmError::MissingBinary { role: ArtifactRole::TestPackage, .. })
        ));
    }
}
