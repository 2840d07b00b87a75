//! Crittercism symbol API double

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::crittercism::{SymbolApi, SymbolUploadError, SymbolUploadResult, UploadStep};

/// One recorded symbol API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolCall {
    Create {
        app_id: String,
    },
    Upload {
        app_id: String,
        resource_id: String,
        zip_path: PathBuf,
    },
    Process {
        app_id: String,
        resource_id: String,
        filename: String,
    },
}

#[derive(Clone)]
pub struct MockSymbolApi {
    resource_id: String,
    calls: Arc<Mutex<Vec<SymbolCall>>>,
    fail_step: Arc<Mutex<Option<(UploadStep, u16)>>>,
    invalid_token: Arc<Mutex<bool>>,
}

impl Default for MockSymbolApi {
    fn default() -> Self {
        Self::new("resource-0001")
    }
}

impl MockSymbolApi {
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            calls: Arc::default(),
            fail_step: Arc::default(),
            invalid_token: Arc::default(),
        }
    }

    /// Answer the given step with a non-2xx status.
    pub fn fail_at(&self, step: UploadStep, status: u16) {
        *self.fail_step.lock().unwrap() = Some((step, status));
    }

    /// Reject the token on the create call.
    pub fn reject_token(&self) {
        *self.invalid_token.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<SymbolCall> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, step: UploadStep) -> SymbolUploadResult<()> {
        match *self.fail_step.lock().unwrap() {
            Some((failing, status)) if failing == step => Err(SymbolUploadError::Api {
                step,
                status,
                body: "Internal Server Error".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl SymbolApi for MockSymbolApi {
    fn create_upload(&self, app_id: &str) -> SymbolUploadResult<String> {
        self.calls.lock().unwrap().push(SymbolCall::Create {
            app_id: app_id.to_string(),
        });
        if *self.invalid_token.lock().unwrap() {
            return Err(SymbolUploadError::InvalidToken);
        }
        self.check(UploadStep::Create)?;
        Ok(self.resource_id.clone())
    }

    fn upload_file(&self, app_id: &str, resource_id: &str, zip_path: &Path) -> SymbolUploadResult<()> {
        self.calls.lock().unwrap().push(SymbolCall::Upload {
            app_id: app_id.to_string(),
            resource_id: resource_id.to_string(),
            zip_path: zip_path.to_path_buf(),
        });
        self.check(UploadStep::Transfer)
    }

    fn process(&self, app_id: &str, resource_id: &str, filename: &str) -> SymbolUploadResult<()> {
        self.calls.lock().unwrap().push(SymbolCall::Process {
            app_id: app_id.to_string(),
            resource_id: resource_id.to_string(),
            filename: filename.to_string(),
        });
        self.check(UploadStep::Process)
    }
}
