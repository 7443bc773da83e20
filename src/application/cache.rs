use crate::utils::fs::has_any_suffix;
use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

/// The local pacman package cache, probed on behalf of peers.
pub struct PackageCache {
    dir: PathBuf,
    suffixes: Vec<String>,
}

impl PackageCache {
    pub fn new(dir: PathBuf, suffixes: Vec<String>) -> Self {
        Self { dir, suffixes }
    }

    /// Scans the cache directory (not its subdirectories) for a package file
    /// named exactly `filename`. Names are compared against directory
    /// entries, never joined onto the cache path.
    pub async fn contains(&self, filename: &str) -> bool {
        if !has_any_suffix(filename, &self.suffixes) {
            return false;
        }

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %self.dir.display(), "Cannot read package cache: {err}");
                return false;
            }
        };

        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) if entry.file_name() == filename => {
                    return fs::metadata(entry.path())
                        .await
                        .map(|meta| meta.is_file())
                        .unwrap_or(false);
                }
                Ok(Some(_)) => continue,
                Ok(None) => return false,
                Err(err) => {
                    warn!(dir = %self.dir.display(), "Package cache scan failed: {err}");
                    return false;
                }
            }
        }
    }
}
