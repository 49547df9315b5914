use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::error::SettingsError;

/// A value mirrored to a JSON file
///
/// Readers always get a complete snapshot. Writers hold the lock until
/// the new value is on disk, so a failed write leaves the previous value
/// in place and concurrent updates never interleave on the file.
#[derive(Debug)]
pub(crate) struct JsonFile<T> {
    path: PathBuf,
    value: RwLock<T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    /// Load the file, falling back to `T::default()` when it does not exist
    pub(crate) async fn open(path: PathBuf) -> Result<Self, SettingsError> {
        let value = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "settings file missing, using defaults");
                T::default()
            }
            Err(source) => return Err(SettingsError::Read { path, source }),
        };

        Ok(Self {
            path,
            value: RwLock::new(value),
        })
    }

    pub(crate) async fn get(&self) -> T {
        self.value.read().await.clone()
    }

    pub(crate) async fn set(&self, value: T) -> Result<(), SettingsError> {
        let mut current = self.value.write().await;
        persist(&self.path, &value).await?;
        *current = value;
        Ok(())
    }
}

async fn persist<T: Serialize>(path: &Path, value: &T) -> Result<(), SettingsError> {
    let write_error = |source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }

    let data = serde_json::to_vec_pretty(value).map_err(SettingsError::Encode)?;

    // Write beside the target and rename so readers never see a partial file
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, data).await.map_err(write_error)?;
    tokio::fs::rename(&staging, path).await.map_err(write_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[tokio::test]
    async fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let file: JsonFile<BTreeMap<String, u32>> = JsonFile::open(dir.path().join("absent.json")).await.unwrap();

        assert!(file.get().await.is_empty());
    }

    #[tokio::test]
    async fn set_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/values.json");
        let file: JsonFile<BTreeMap<String, u32>> = JsonFile::open(path.clone()).await.unwrap();

        file.set(BTreeMap::from([("rounds".to_owned(), 3)])).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"rounds\": 3"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFile::<BTreeMap<String, u32>>::open(path).await.unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }
}
