use std::path::Path;
use tokio::fs;
use tracing::warn;

/// pacman itself points at flocon, so the real mirror hides behind a comment:
///
/// ```text
/// # flocon: Server = https://mirror.example/$repo/os/$arch
/// Server = http://localhost:19433/$repo/os/$arch
/// ```
const MARKER: &str = "# flocon: Server";

pub async fn find_fallback_mirror(path: &Path) -> Option<String> {
    match fs::read_to_string(path).await {
        Ok(contents) => parse_fallback_mirror(&contents),
        Err(err) => {
            warn!(path = %path.display(), "Cannot read mirrorlist: {err}");
            None
        }
    }
}

/// Only the first marker line counts.
pub fn parse_fallback_mirror(contents: &str) -> Option<String> {
    let line = contents.lines().find(|line| line.starts_with(MARKER))?;
    let (_, url) = line.split_once('=')?;

    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}
