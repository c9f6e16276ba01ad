//! Pin persistence.
//!
//! Pins are stored as a JSON array of encoded strings. Writes go through a
//! temporary file in the same directory and are renamed into place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::constants::APP_BUNDLE_ID;
use crate::error::VeilError;

const PINS_FILE_NAME: &str = "pins.json";

/// Storage for the encoded pin list.
pub trait PinStore: Send + Sync {
    /// Loads every stored pin string. A missing store is empty.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::PinStoreError`] if the store exists but is unreadable.
    fn load(&self) -> Result<Vec<String>, VeilError>;

    /// Replaces the stored pins.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::PinStoreError`] or [`VeilError::IoError`] if the
    /// write fails.
    fn save(&self, pins: &[String]) -> Result<(), VeilError>;
}

/// Pins kept in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonPinStore {
    path: PathBuf,
}

impl JsonPinStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self { Self { path } }

    /// Store at the default location.
    #[must_use]
    pub fn at_default_path() -> Self { Self::new(default_pins_path()) }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }
}

impl PinStore for JsonPinStore {
    fn load(&self) -> Result<Vec<String>, VeilError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(VeilError::PinStoreError(format!("{}: {err}", self.path.display()))),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, pins: &[String]) -> Result<(), VeilError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(pins)?;
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.persist(&self.path).map_err(|err| VeilError::IoError(err.error.to_string()))?;

        tracing::debug!(path = %self.path.display(), count = pins.len(), "pins saved");
        Ok(())
    }
}

/// Pins kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryPinStore {
    pins: Mutex<Vec<String>>,
}

impl MemoryPinStore {
    /// A store pre-filled with `pins`.
    #[must_use]
    pub fn with_pins<I, S>(pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { pins: Mutex::new(pins.into_iter().map(Into::into).collect()) }
    }
}

impl PinStore for MemoryPinStore {
    fn load(&self) -> Result<Vec<String>, VeilError> { Ok(self.pins.lock().clone()) }

    fn save(&self, pins: &[String]) -> Result<(), VeilError> {
        *self.pins.lock() = pins.to_vec();
        Ok(())
    }
}

/// `<data dir>/<bundle id>/pins.json`, or under `/tmp` without a data dir.
#[must_use]
pub fn default_pins_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(format!("/tmp/{APP_BUNDLE_ID}/{PINS_FILE_NAME}")),
        |data| data.join(APP_BUNDLE_ID).join(PINS_FILE_NAME),
    )
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonPinStore::new(dir.path().join("pins.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_parent_and_reloads() {
        let dir = TempDir::new().unwrap();
        let store = JsonPinStore::new(dir.path().join("nested").join("pins.json"));
        let pins = vec!["com.example.app".to_string(), "menuextra:com.apple.menuextra.clock".to_string()];

        store.save(&pins).unwrap();

        assert_eq!(store.load().unwrap(), pins);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pins.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonPinStore::new(path).load().unwrap_err();
        assert!(matches!(err, VeilError::PinStoreError(_)));
    }

    #[test]
    fn test_default_path_contains_bundle_id() {
        let path = default_pins_path();
        assert!(path.to_string_lossy().contains(APP_BUNDLE_ID));
        assert!(path.ends_with(PINS_FILE_NAME));
    }
}
