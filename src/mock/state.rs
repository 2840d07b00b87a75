//! Mock Device Farm state
//!
//! Projects, pools, upload slots and runs, plus scripted status
//! progressions that `get_upload`/`get_run` walk through one step per call.

use std::collections::{HashMap, VecDeque};

use devicefarm_protocol::{
    Counters, DevicePool, Operation, Project, Run, RunResult, RunStatus, TestSpec, Upload, UploadStatus,
    UploadType,
};

/// One recorded API call, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListProjects,
    ListDevicePools {
        project_arn: String,
    },
    CreateUpload {
        project_arn: String,
        name: String,
        content_type: String,
        upload_type: UploadType,
    },
    GetUpload {
        arn: String,
    },
    ScheduleRun {
        project_arn: String,
        app_arn: String,
        device_pool_arn: String,
        test: TestSpec,
    },
    GetRun {
        arn: String,
    },
}

impl ApiCall {
    pub fn operation(&self) -> Operation {
        match self {
            Self::ListProjects => Operation::ListProjects,
            Self::ListDevicePools { .. } => Operation::ListDevicePools,
            Self::CreateUpload { .. } => Operation::CreateUpload,
            Self::GetUpload { .. } => Operation::GetUpload,
            Self::ScheduleRun { .. } => Operation::ScheduleRun,
            Self::GetRun { .. } => Operation::GetRun,
        }
    }
}

/// One observable state of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunStep {
    pub status: RunStatus,
    pub result: Option<RunResult>,
    pub message: Option<String>,
}

impl RunStep {
    pub fn running() -> Self {
        Self {
            status: RunStatus::Running,
            result: Some(RunResult::Pending),
            message: None,
        }
    }

    pub fn completed(result: RunResult) -> Self {
        Self {
            status: RunStatus::Completed,
            result: Some(result),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Scripted progression of an upload slot
#[derive(Debug, Clone, PartialEq)]
pub struct UploadScript {
    pub statuses: Vec<UploadStatus>,
    pub message: Option<String>,
}

impl UploadScript {
    pub fn succeeds() -> Self {
        Self {
            statuses: vec![UploadStatus::Processing, UploadStatus::Succeeded],
            message: None,
        }
    }

    pub fn fails(message: impl Into<String>) -> Self {
        Self {
            statuses: vec![UploadStatus::Processing, UploadStatus::Failed],
            message: Some(message.into()),
        }
    }

    /// Never leaves PROCESSING
    pub fn stuck() -> Self {
        Self {
            statuses: vec![UploadStatus::Processing],
            message: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TrackedUpload {
    pub upload: Upload,
    pub pending: VecDeque<UploadStatus>,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct TrackedRun {
    pub run: Run,
    pub pending: VecDeque<RunStep>,
}

/// Take the next scripted value; the last one repeats forever.
pub(crate) fn advance<T: Clone>(pending: &mut VecDeque<T>) -> Option<T> {
    if pending.len() > 1 {
        pending.pop_front()
    } else {
        pending.front().cloned()
    }
}

/// Full mutable state behind the mock
#[derive(Debug, Default)]
pub struct MockState {
    pub(crate) projects: Vec<Project>,
    pub(crate) pools: HashMap<String, Vec<DevicePool>>,
    pub(crate) uploads: HashMap<String, TrackedUpload>,
    pub(crate) runs: HashMap<String, TrackedRun>,
    pub(crate) upload_scripts: HashMap<UploadType, UploadScript>,
    pub(crate) run_script: Vec<RunStep>,
    pub(crate) calls: Vec<ApiCall>,
    next_id: u32,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_arn(&mut self, resource: &str) -> String {
        self.next_id += 1;
        format!(
            "arn:aws:devicefarm:us-west-2:123456789012:{}:mock-{:04}",
            resource, self.next_id
        )
    }

    pub(crate) fn upload_script(&self, upload_type: UploadType) -> UploadScript {
        self.upload_scripts
            .get(&upload_type)
            .cloned()
            .unwrap_or_else(UploadScript::succeeds)
    }

    pub(crate) fn run_script(&self) -> Vec<RunStep> {
        if self.run_script.is_empty() {
            vec![RunStep::running(), RunStep::completed(RunResult::Passed)]
        } else {
            self.run_script.clone()
        }
    }

    pub(crate) fn new_run(&mut self, arn: String) -> Run {
        let pending: VecDeque<RunStep> = self.run_script().into();
        let run = Run {
            arn: arn.clone(),
            name: Some("mobile-lane".to_string()),
            status: RunStatus::Scheduling,
            result: Some(RunResult::Pending),
            message: None,
            counters: Some(Counters::default()),
        };
        self.runs.insert(
            arn,
            TrackedRun {
                run: run.clone(),
                pending,
            },
        );
        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_repeats_last() {
        let mut pending: VecDeque<u32> = vec![1, 2, 3].into();
        assert_eq!(advance(&mut pending), Some(1));
        assert_eq!(advance(&mut pending), Some(2));
        assert_eq!(advance(&mut pending), Some(3));
        assert_eq!(advance(&mut pending), Some(3));
    }

    #[test]
    fn test_arns_are_unique() {
        let mut state = MockState::new();
        let a = state.next_arn("upload");
        let b = state.next_arn("upload");
        assert_ne!(a, b);
        assert!(a.starts_with("arn:aws:devicefarm:"));
    }

    #[test]
    fn test_default_scripts() {
        let state = MockState::new();
        assert_eq!(state.upload_script(UploadType::AndroidApp), UploadScript::succeeds());
        let steps = state.run_script();
        assert_eq!(steps.last().unwrap().result, Some(RunResult::Passed));
    }
}
