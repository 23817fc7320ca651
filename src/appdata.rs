use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

const APP_NAME: &str = "obsidian";

/// Per-platform application data directory, following the same rules the
/// note application itself uses.
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));

    if cfg!(target_os = "macos") {
        home.join("Library").join("Application Support").join(APP_NAME)
    } else if cfg!(target_os = "windows") {
        let local = env::var_os("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("AppData").join("Local"));
        local.join(APP_NAME).join("Data")
    } else {
        // https://specifications.freedesktop.org/basedir-spec/basedir-spec-latest.html
        let data = env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local").join("share"));
        data.join(APP_NAME)
    }
}

#[derive(Debug, Deserialize)]
struct VaultRegistry {
    #[serde(default)]
    vaults: BTreeMap<String, VaultEntry>,
}

#[derive(Debug, Deserialize)]
struct VaultEntry {
    path: String,
}

/// Cache location for a vault that keeps its cache in the application data
/// directory: `ObsidianCache/<vault-id>.json`, with the vault id looked up
/// from the `obsidian.json` registry by absolute vault path.
pub fn cache_path_for_vault(vault: &Path) -> Result<PathBuf> {
    let data_dir = app_data_dir();
    let id = vault_id(&data_dir.join("obsidian.json"), vault)?;
    Ok(data_dir.join("ObsidianCache").join(format!("{id}.json")))
}

pub fn vault_id(registry_path: &Path, vault: &Path) -> Result<String> {
    let raw = fs::read_to_string(registry_path).map_err(|source| Error::RegistryRead {
        path: registry_path.to_path_buf(),
        source,
    })?;
    let registry: VaultRegistry =
        serde_json::from_str(&raw).map_err(|source| Error::RegistryParse {
            path: registry_path.to_path_buf(),
            source,
        })?;
    lookup(&registry, vault)
}

fn lookup(registry: &VaultRegistry, vault: &Path) -> Result<String> {
    for (id, entry) in &registry.vaults {
        if Path::new(&entry.path) == vault {
            return Ok(id.clone());
        }
    }
    Err(Error::VaultNotRegistered {
        path: vault.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_registry(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("obsidian.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_vault_id_found_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let registry = write_registry(
            dir.path(),
            r#"{
                "vaults": {
                    "a1b2c3": { "path": "/home/me/notes", "ts": 1700000000000, "open": true },
                    "d4e5f6": { "path": "/home/me/work" }
                }
            }"#,
        );

        let id = vault_id(&registry, Path::new("/home/me/work")).unwrap();
        assert_eq!(id, "d4e5f6");
    }

    #[test]
    fn test_unregistered_vault_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let registry = write_registry(dir.path(), r#"{ "vaults": {} }"#);

        let err = vault_id(&registry, Path::new("/home/me/missing")).unwrap_err();
        assert!(matches!(err, Error::VaultNotRegistered { .. }));
        assert!(err.to_string().contains("/home/me/missing"));
    }

    #[test]
    fn test_missing_registry_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = vault_id(&dir.path().join("obsidian.json"), Path::new("/v")).unwrap_err();
        assert!(matches!(err, Error::RegistryRead { .. }));
    }
}
