//! Locating and archiving the dSYM bundle.

use std::env;
use std::path::{Path, PathBuf};

use tracing::info;

use super::error::{SymbolUploadError, SymbolUploadResult};
use crate::command::CommandRunner;

/// Environment variables consulted, in order, when no path is given.
pub const DSYM_ENV_FALLBACKS: [&str; 2] = ["DSYM_OUTPUT_PATH", "DSYM_ZIP_PATH"];

/// Resolve the dSYM path: explicit value first, then the build outputs
/// published through the environment. The result is absolute and exists.
pub fn resolve_dsym_path(
    explicit: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> SymbolUploadResult<PathBuf> {
    let candidate = explicit.map(Path::to_path_buf).or_else(|| {
        DSYM_ENV_FALLBACKS
            .iter()
            .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
            .map(PathBuf::from)
    });

    let path = candidate.ok_or(SymbolUploadError::NoDsym)?;
    let path = if path.is_absolute() {
        path
    } else {
        env::current_dir()
            .map_err(|source| SymbolUploadError::Io {
                path: path.clone(),
                source,
            })?
            .join(path)
    };

    if !path.exists() {
        return Err(SymbolUploadError::DsymNotFound(path));
    }
    Ok(path)
}

pub fn is_zip(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("zip")
}

/// Archive the bundle next to itself as `<name>.zip`; a path that already
/// is a zip archive is returned unchanged.
pub fn zip_dsym(runner: &dyn CommandRunner, dsym: &Path) -> SymbolUploadResult<PathBuf> {
    if is_zip(dsym) {
        return Ok(dsym.to_path_buf());
    }

    let name = dsym
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| SymbolUploadError::DsymNotFound(dsym.to_path_buf()))?;
    let parent = dsym.parent().unwrap_or_else(|| Path::new("."));
    let archive = format!("{}.zip", name);

    info!(dsym = %dsym.display(), "Zipping dSYM");
    let output = runner
        .run("zip", &["-r", &archive, name], parent)
        .map_err(SymbolUploadError::ZipSpawn)?;
    if !output.success() {
        return Err(SymbolUploadError::ZipFailed(output.describe_failure()));
    }

    Ok(parent.join(archive))
}
