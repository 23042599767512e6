//src/storage.rs
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::store::WorkoutRecord;

const WORKOUTS_FILE_NAME: &str = "workouts.json";
const EXERCISES_FILE_NAME: &str = "exercises.json";
const APP_DATA_DIR: &str = "fitness-log";
const DATA_ENV_VAR: &str = "FITNESS_LOG_DATA_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not determine data directory.")]
    CannotDetermineDataDir,
    #[error("I/O error accessing data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse data file (JSON) {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize data (JSON): {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Owns the data directory and reads/writes the two JSON files in it:
/// `workouts.json` (logged workouts) and `exercises.json` (the exercise
/// catalog).
///
/// Writes are plain overwrites, not atomic renames; a crash mid-write can
/// leave a truncated file.
#[derive(Debug, Clone)]
pub struct Storage {
    base_dir: PathBuf,
}

impl Storage {
    /// Resolves the data directory and creates it if needed.
    ///
    /// `FITNESS_LOG_DATA_DIR` overrides the default location under the
    /// platform data dir (e.g. `~/.local/share/fitness-log`).
    ///
    /// # Errors
    ///
    /// Returns `Error::CannotDetermineDataDir` if no platform data dir
    /// exists and the environment variable is unset, or `Error::Io` if the
    /// directory cannot be created.
    pub fn new() -> Result<Self, Error> {
        let data_dir_override = std::env::var(DATA_ENV_VAR).ok();

        let base_dir = if let Some(path_str) = data_dir_override {
            let path = PathBuf::from(path_str);
            if !path.is_dir() {
                log::warn!(
                    "Environment variable {} points to '{}', which is not a directory. Trying to create it.",
                    DATA_ENV_VAR,
                    path.display()
                );
                fs::create_dir_all(&path)?;
            }
            path
        } else {
            let base_data_dir = dirs::data_dir().ok_or(Error::CannotDetermineDataDir)?;
            base_data_dir.join(APP_DATA_DIR)
        };

        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
        }

        Ok(Self { base_dir })
    }

    /// Creates storage rooted at an explicit directory. Used by tests.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory cannot be created.
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self, Error> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[must_use]
    pub fn workouts_path(&self) -> PathBuf {
        self.base_dir.join(WORKOUTS_FILE_NAME)
    }

    #[must_use]
    pub fn exercises_path(&self) -> PathBuf {
        self.base_dir.join(EXERCISES_FILE_NAME)
    }

    /// Loads logged workouts. `Ok(None)` means the file does not exist yet;
    /// a present-but-unreadable file is an error, so a recoverable file is
    /// never silently replaced by an empty log.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` on read failure or `Error::Parse` on malformed
    /// JSON.
    pub fn load_workouts(&self) -> Result<Option<Vec<WorkoutRecord>>, Error> {
        self.load_json(WORKOUTS_FILE_NAME)
    }

    /// # Errors
    ///
    /// Returns `Error::Io` on write failure.
    pub fn save_workouts(&self, records: &[WorkoutRecord]) -> Result<(), Error> {
        self.save_json(WORKOUTS_FILE_NAME, &records)
    }

    /// Loads the exercise catalog names. `Ok(None)` means the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` on read failure or `Error::Parse` on malformed
    /// JSON.
    pub fn load_exercises(&self) -> Result<Option<Vec<String>>, Error> {
        self.load_json(EXERCISES_FILE_NAME)
    }

    /// # Errors
    ///
    /// Returns `Error::Io` on write failure.
    pub fn save_exercises(&self, names: &[String]) -> Result<(), Error> {
        self.save_json(EXERCISES_FILE_NAME, &names)
    }

    fn load_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, Error> {
        let path = self.base_dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let data = serde_json::from_str(&content).map_err(|source| Error::Parse { path, source })?;
        Ok(Some(data))
    }

    fn save_json<T: Serialize>(&self, name: &str, data: &T) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(data).map_err(Error::Serialize)?;
        fs::write(self.base_dir.join(name), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, storage)
    }

    fn record(date: &str, exercise: &str) -> WorkoutRecord {
        WorkoutRecord {
            date: date.to_string(),
            exercise: exercise.to_string(),
            reps: "10".to_string(),
            sets: "3".to_string(),
        }
    }

    #[test]
    fn test_missing_files_load_as_none() {
        let (_dir, storage) = make_test_storage();
        assert!(storage.load_workouts().unwrap().is_none());
        assert!(storage.load_exercises().unwrap().is_none());
    }

    #[test]
    fn test_workouts_round_trip() {
        let (_dir, storage) = make_test_storage();
        let records = vec![record("15.03.2024", "Squats"), record("16.03.2024", "Running")];
        storage.save_workouts(&records).unwrap();

        let loaded = storage.load_workouts().unwrap().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_exercises_round_trip() {
        let (_dir, storage) = make_test_storage();
        let names = vec!["Squats".to_string(), "Other".to_string()];
        storage.save_exercises(&names).unwrap();

        let loaded = storage.load_exercises().unwrap().unwrap();
        assert_eq!(loaded, names);
    }

    #[test]
    fn test_saved_files_are_pretty_printed() {
        let (_dir, storage) = make_test_storage();
        storage.save_workouts(&[record("15.03.2024", "Squats")]).unwrap();

        let content = fs::read_to_string(storage.workouts_path()).unwrap();
        assert!(content.contains('\n'));
        assert!(content.contains("  \"date\""));
    }

    #[test]
    fn test_env_override_must_resolve_to_a_directory() {
        let dir = TempDir::new().unwrap();

        // A missing directory is created on the spot.
        let nested = dir.path().join("data").join("deep");
        std::env::set_var(DATA_ENV_VAR, &nested);
        let created = Storage::new();

        // An existing non-directory cannot be, and must fail here rather
        // than on the first save.
        let occupied = dir.path().join("occupied");
        fs::write(&occupied, "plain file").unwrap();
        std::env::set_var(DATA_ENV_VAR, &occupied);
        let rejected = Storage::new();

        std::env::remove_var(DATA_ENV_VAR);

        let storage = created.unwrap();
        assert_eq!(storage.base_dir(), nested);
        assert!(nested.is_dir());
        assert!(matches!(rejected, Err(Error::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let (_dir, storage) = make_test_storage();
        fs::write(storage.workouts_path(), "{ not json").unwrap();

        let err = storage.load_workouts().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("workouts.json"));
    }

    #[test]
    fn test_empty_array_round_trips() {
        let (_dir, storage) = make_test_storage();
        storage.save_workouts(&[]).unwrap();
        assert_eq!(storage.load_workouts().unwrap(), Some(vec![]));
    }
}
