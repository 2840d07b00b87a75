//! Binary artifacts and their upload types.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use devicefarm_protocol::UploadType;

/// Upload type for an application binary.
///
/// `.apk` is an Android app; every other extension (or none) is treated as
/// an iOS app. The comparison is on the literal extension, case included.
pub fn artifact_type_for(path: &Path) -> UploadType {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("apk") => UploadType::AndroidApp,
        _ => UploadType::IosApp,
    }
}

/// Which of the two artifacts an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactRole {
    Application,
    TestPackage,
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactRole::Application => f.write_str("application binary"),
            ArtifactRole::TestPackage => f.write_str("test binary"),
        }
    }
}

/// A local binary destined for an upload slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// Base name, used as the upload name.
    pub name: String,
    pub upload_type: UploadType,
    pub role: ArtifactRole,
}

impl Artifact {
    pub fn application(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let upload_type = artifact_type_for(&path);
        Self::new(path, upload_type, ArtifactRole::Application)
    }

    pub fn test_package(path: impl Into<PathBuf>) -> Self {
        Self::new(
            path.into(),
            UploadType::InstrumentationTestPackage,
            ArtifactRole::TestPackage,
        )
    }

    fn new(path: PathBuf, upload_type: UploadType, role: ArtifactRole) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            path,
            name,
            upload_type,
            role,
        }
    }

    /// Read the whole file into memory.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}
