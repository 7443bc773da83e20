use std::{env, path::PathBuf};
use tokio::io;

const CONFIG_FILE: &str = "config.toml";

/// Returns the path of the Flocon configuration file.
///
/// `FLOCON_CONFIG` wins when set. Otherwise the file lives in
/// `$XDG_CONFIG_HOME/flocon`, falling back to `$HOME/.config/flocon`.
pub fn config_file() -> io::Result<PathBuf> {
    if let Some(path) = env::var_os("FLOCON_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    Ok(config_dir()?.join(CONFIG_FILE))
}

fn config_dir() -> io::Result<PathBuf> {
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;

    Ok(config_home.join("flocon"))
}

pub fn has_any_suffix(name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}
