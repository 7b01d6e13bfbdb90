//! Dotenv preloading
//!
//! Fills the process environment from the dotenv files before configuration
//! is loaded, so `FOLIO_*` and `RUST_LOG` can live there. The relay key is
//! left out: the credential resolver reads it from the files on every
//! request, which keeps `.env.local` ahead of `.env` and picks up edits
//! without a restart.

use anyhow::{Context, Result};
use folio_relay::{DEFAULT_FALLBACK_FILES, DEFAULT_KEY_NAME};
use std::path::PathBuf;

/// Variable that renames the relay key
const KEY_NAME_VAR: &str = "FOLIO_RELAY__KEY_NAME";

/// Files preloaded at startup, highest priority first
pub fn default_dotenv_files() -> Vec<PathBuf> {
    DEFAULT_FALLBACK_FILES.iter().map(PathBuf::from).collect()
}

/// Entries from `files`; for a key set in several files the first file wins.
/// Missing files are skipped.
fn read_entries(files: &[PathBuf]) -> Result<Vec<(String, String)>> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for path in files {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => continue,
            Err(e) => return Err(e).with_context(|| format!("Failed to open {}", path.display())),
        };
        for item in iter {
            let (key, value) = item.with_context(|| format!("Failed to parse {}", path.display()))?;
            if !entries.iter().any(|(existing, _)| *existing == key) {
                entries.push((key, value));
            }
        }
    }
    Ok(entries)
}

/// Relay key name: the environment, then the files, then `default_key`
fn relay_key_name(entries: &[(String, String)], default_key: &str) -> String {
    std::env::var(KEY_NAME_VAR)
        .ok()
        .or_else(|| {
            entries
                .iter()
                .find(|(key, _)| key == KEY_NAME_VAR)
                .map(|(_, value)| value.clone())
        })
        .unwrap_or_else(|| default_key.to_string())
}

/// Load `files` into the process environment without overriding existing
/// variables and without the relay key. Returns the names that were set.
pub fn preload_dotenv(files: &[PathBuf], default_key: &str) -> Result<Vec<String>> {
    let entries = read_entries(files)?;
    let key_name = relay_key_name(&entries, default_key);

    let mut loaded = Vec::new();
    for (key, value) in entries {
        if key == key_name || std::env::var_os(&key).is_some() {
            continue;
        }
        std::env::set_var(&key, value);
        loaded.push(key);
    }
    Ok(loaded)
}

/// Preload the standard files for the standard relay key
pub fn preload_default_dotenv() -> Result<Vec<String>> {
    preload_dotenv(&default_dotenv_files(), DEFAULT_KEY_NAME)
}
