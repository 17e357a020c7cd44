use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn slurp_file<I: AsRef<str>>(path: I) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs_err::read(path).with_context(|| format!("reading {}", path))
}

pub fn maybe_read_json<T: DeserializeOwned>(path: String) -> Result<T> {
    let bytes = slurp_file(&path)?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing JSON from {}", path))
}

/// Creates parent directories as needed.
pub fn write_string(path: String, contents: &str) -> Result<()> {
    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    fs_err::write(&path, contents)?;
    info!("Wrote {}", path);
    Ok(())
}

pub fn write_json<T: Serialize>(path: String, obj: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(obj)?;
    write_string(path, &contents)
}
