use std::fmt;
use std::path::{Path, PathBuf};

/// Failure to read or parse a geometry file.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportError {
    pub path: PathBuf,
    pub message: String,
}

impl ImportError {
    pub(crate) fn new(path: &Path, msg: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            message: msg.into(),
        }
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to import '{}': {}", self.path.display(), self.message)
    }
}

impl std::error::Error for ImportError {}

/// Failure to read or decode an image file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    pub path: PathBuf,
    pub message: String,
}

impl DecodeError {
    pub(crate) fn new(path: &Path, msg: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            message: msg.into(),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to decode '{}': {}", self.path.display(), self.message)
    }
}

impl std::error::Error for DecodeError {}
