//! Crittercism upload errors.

use std::path::PathBuf;

use thiserror::Error;

/// Crittercism upload step, used in error messages and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    Create,
    Transfer,
    Process,
}

impl std::fmt::Display for UploadStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Create => "create symbol upload",
            Self::Transfer => "upload symbol file",
            Self::Process => "process symbol upload",
        })
    }
}

/// dSYM upload failure
#[derive(Debug, Error)]
pub enum SymbolUploadError {
    #[error("Couldn't find file at path '{}'", .0.display())]
    DsymNotFound(PathBuf),

    #[error("Couldn't find any dSYM file")]
    NoDsym,

    #[error("could not run zip: {0}")]
    ZipSpawn(#[source] std::io::Error),

    #[error("zip failed: {0}")]
    ZipFailed(String),

    #[error("Server error, failed to upload the dSYM file: invalid token specified")]
    InvalidToken,

    #[error("{step} failed: {source}")]
    Transport {
        step: UploadStep,
        #[source]
        source: reqwest::Error,
    },

    #[error("{step} failed with HTTP {status}: {body}")]
    Api {
        step: UploadStep,
        status: u16,
        body: String,
    },

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected create response: {0}")]
    Decode(String),
}

impl SymbolUploadError {
    pub fn exit_code(&self) -> i32 {
        50
    }
}

pub type SymbolUploadResult<T> = Result<T, SymbolUploadError>;
