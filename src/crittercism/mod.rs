//! Crittercism dSYM upload action

pub mod client;
pub mod dsym;
pub mod error;
pub mod uploader;

pub use client::{parse_resource_id, HttpSymbolApi, SymbolApi};
pub use dsym::{is_zip, resolve_dsym_path, zip_dsym, DSYM_ENV_FALLBACKS};
pub use error::{SymbolUploadError, SymbolUploadResult, UploadStep};
pub use uploader::{archive_filename, SymbolUploadConfig, SymbolUploadOutcome, SymbolUploader, SUMMARY_SCHEMA_ID};
