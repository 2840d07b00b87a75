//! Translations import action
//!
//! Runs the external translations tool in the project root and commits the
//! `.strings` files it changed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::command::CommandRunner;

pub const SUMMARY_SCHEMA_ID: &str = "mobile-lane/update_translations@1";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update translations";

#[derive(Debug, Error)]
pub enum TranslationsError {
    #[error("Couldn't find a directory at path '{}'", .0.display())]
    MissingProjectRoot(PathBuf),

    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed with {detail}")]
    CommandFailed { command: String, detail: String },
}

impl TranslationsError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingProjectRoot(_) => 1,
            Self::Spawn { .. } | Self::CommandFailed { .. } => 60,
        }
    }
}

pub type TranslationsResult<T> = Result<T, TranslationsError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationsConfig {
    pub project_root: PathBuf,
    pub commit_message: String,
}

/// What happened to the working tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TranslationsOutcome {
    NoChanges,
    Committed { files: Vec<String> },
    /// Files changed but `git add`/`git commit` failed.
    NotCommitted { files: Vec<String>, reason: String },
}

/// Serializable summary of one invocation
#[derive(Debug, Clone, Serialize)]
pub struct TranslationsSummary {
    pub schema_id: String,
    pub invocation_id: String,
    pub created_at: DateTime<Utc>,
    pub project_root: PathBuf,
    pub commit_message: String,
    #[serde(flatten)]
    pub outcome: TranslationsOutcome,
}

impl TranslationsSummary {
    pub fn new(config: &TranslationsConfig, outcome: TranslationsOutcome) -> Self {
        Self {
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            invocation_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            project_root: config.project_root.clone(),
            commit_message: config.commit_message.clone(),
            outcome,
        }
    }

    pub fn to_human(&self) -> String {
        match &self.outcome {
            TranslationsOutcome::NoChanges => {
                "Didn't commit any changes, no translations were updated.".to_string()
            }
            TranslationsOutcome::Committed { files } => {
                format!("Committed \"{}\" ({} files).", self.commit_message, files.len())
            }
            TranslationsOutcome::NotCommitted { reason, .. } => {
                format!("Didn't commit any changes: {}", reason)
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Keep the `.strings` paths of `git diff --name-only` output.
pub fn changed_strings_files(diff_output: &str) -> Vec<String> {
    diff_output
        .lines()
        .map(str::trim)
        .filter(|line| line.ends_with(".strings"))
        .map(str::to_string)
        .collect()
}

pub struct TranslationsUpdater {
    runner: Arc<dyn CommandRunner>,
    tool: String,
}

impl TranslationsUpdater {
    pub fn new(runner: Arc<dyn CommandRunner>, tool: impl Into<String>) -> Self {
        Self {
            runner,
            tool: tool.into(),
        }
    }

    pub fn run(&self, config: &TranslationsConfig) -> TranslationsResult<TranslationsOutcome> {
        let root = &config.project_root;
        if !root.is_dir() {
            return Err(TranslationsError::MissingProjectRoot(root.clone()));
        }

        info!(tool = %self.tool, root = %root.display(), "Importing translations");
        self.checked(&self.tool, &["import"], root)?;

        let diff = self.checked("git", &["diff", "--name-only", "HEAD"], root)?;
        let files = changed_strings_files(&diff);
        if files.is_empty() {
            info!("Didn't commit any changes, no translations were updated.");
            return Ok(TranslationsOutcome::NoChanges);
        }

        match self.commit(root, &files, &config.commit_message) {
            Ok(()) => {
                info!(count = files.len(), "Committed \"{}\"", config.commit_message);
                Ok(TranslationsOutcome::Committed { files })
            }
            Err(e) => {
                warn!(error = %e, "Didn't commit any changes.");
                Ok(TranslationsOutcome::NotCommitted {
                    files,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn commit(&self, root: &Path, files: &[String], message: &str) -> TranslationsResult<()> {
        let mut add_args = vec!["add"];
        add_args.extend(files.iter().map(String::as_str));
        self.checked("git", &add_args, root)?;
        self.checked("git", &["commit", "-m", message], root)?;
        Ok(())
    }

    /// Run and return stdout, failing on a non-zero exit.
    fn checked(&self, program: &str, args: &[&str], cwd: &Path) -> TranslationsResult<String> {
        let output = self
            .runner
            .run(program, args, cwd)
            .map_err(|source| TranslationsError::Spawn {
                program: program.to_string(),
                source,
            })?;
        if !output.success() {
            return Err(TranslationsError::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                detail: output.describe_failure(),
            });
        }
        Ok(output.stdout)
    }
}
