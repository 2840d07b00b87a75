//! Symbol upload workflow: create the upload, zip the bundle, transfer the
//! archive and ask the service to process it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::client::SymbolApi;
use super::dsym::zip_dsym;
use super::error::SymbolUploadResult;
use crate::command::CommandRunner;

pub const SUMMARY_SCHEMA_ID: &str = "mobile-lane/crittercism@1";

/// Inputs of one symbol upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolUploadConfig {
    /// Resolved, existing dSYM bundle or zip archive.
    pub dsym_path: PathBuf,
    pub app_id: String,
}

/// Result of a completed symbol upload
#[derive(Debug, Clone, Serialize)]
pub struct SymbolUploadOutcome {
    pub schema_id: String,
    pub invocation_id: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub app_id: String,
    pub resource_id: String,
    pub archive: PathBuf,
    pub filename: String,
}

impl SymbolUploadOutcome {
    pub fn to_human(&self) -> String {
        format!(
            "Upload to Crittercism complete: {} (resource {})",
            self.filename, self.resource_id
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Name the processing call reports for the archive.
pub fn archive_filename(archive: &Path) -> String {
    archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub struct SymbolUploader {
    api: Arc<dyn SymbolApi>,
    runner: Arc<dyn CommandRunner>,
}

impl SymbolUploader {
    pub fn new(api: Arc<dyn SymbolApi>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { api, runner }
    }

    /// create → zip → transfer → process; the first failure aborts.
    pub fn run(&self, config: &SymbolUploadConfig) -> SymbolUploadResult<SymbolUploadOutcome> {
        let resource_id = self.api.create_upload(&config.app_id)?;
        info!(%resource_id, "Retrieved resource ID");

        let archive = zip_dsym(self.runner.as_ref(), &config.dsym_path)?;

        info!(archive = %archive.display(), "Uploading dSYM file");
        self.api.upload_file(&config.app_id, &resource_id, &archive)?;

        let filename = archive_filename(&archive);
        info!("Verifying upload");
        self.api.process(&config.app_id, &resource_id, &filename)?;
        info!("Upload to Crittercism complete");

        Ok(SymbolUploadOutcome {
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            invocation_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            status: "uploaded".to_string(),
            app_id: config.app_id.clone(),
            resource_id,
            archive,
            filename,
        })
    }
}
