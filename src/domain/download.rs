use crate::domain::message::FILE_SEPARATOR;
use std::fmt;
use thiserror::Error;

/// The `/<repo>/os/<arch>/<filename>` path pacman asks the redirect server for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPath {
    pub repo: String,
    pub arch: String,
    pub filename: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DownloadPathError {
    #[error("empty path segment")]
    EmptySegment,
    #[error("filename contains a reserved sequence")]
    ReservedFilename,
}

impl DownloadPath {
    pub fn new(repo: &str, arch: &str, filename: &str) -> Result<Self, DownloadPathError> {
        if repo.is_empty() || arch.is_empty() || filename.is_empty() {
            return Err(DownloadPathError::EmptySegment);
        }

        // The wire codec does not escape its field separator.
        if filename.contains('/') || filename.contains(FILE_SEPARATOR) {
            return Err(DownloadPathError::ReservedFilename);
        }

        Ok(Self {
            repo: repo.to_string(),
            arch: arch.to_string(),
            filename: filename.to_string(),
        })
    }
}

impl fmt::Display for DownloadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/os/{}/{}", self.repo, self.arch, self.filename)
    }
}

/// Where a download request ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Peer(String),
    Mirror(String),
    NotFound,
}

impl Redirect {
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Peer(url) | Self::Mirror(url) => Some(url),
            Self::NotFound => None,
        }
    }
}
