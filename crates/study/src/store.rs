//! Study file storage.
//!
//! One pretty-printed JSON file per study under the storage directory,
//! named `<id>.json`. The directory is created on first save.

use std::path::{Path, PathBuf};
use tokio::fs;

use study_core::model::StudyFile;
use study_core::serializer;
use study_core::StudyError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Study '{0}' does not exist")]
    NotFound(String),

    #[error("Invalid study id '{0}'")]
    InvalidId(String),

    #[error(transparent)]
    Study(#[from] StudyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct StudyStore {
    root: PathBuf,
}

impl StudyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.root.join(format!("{id}.json")))
    }

    async fn ensure_dir(&self) -> Result<(), StoreError> {
        if !fs::try_exists(&self.root).await? {
            fs::create_dir_all(&self.root).await?;
            tracing::info!("Created study directory {}", self.root.display());
        }
        Ok(())
    }

    /// Write the study, generating an id when none is given. The file is
    /// written next to its target and renamed into place.
    pub async fn save(&self, study: &StudyFile, id: Option<&str>) -> Result<String, StoreError> {
        let id = match id {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().simple().to_string(),
        };
        let path = self.path_for(&id)?;
        let json = serializer::to_json(study)?;

        self.ensure_dir().await?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(id = %id, moves = study.moves.len(), "Saved study");
        Ok(id)
    }

    /// Read and upgrade a stored study.
    pub async fn load(&self, id: &str) -> Result<StudyFile, StoreError> {
        let path = self.path_for(id)?;
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serializer::from_json(&text)?)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let path = self.path_for(id)?;
        Ok(fs::try_exists(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::import::import_study;

    #[tokio::test]
    async fn test_save_creates_directory_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = StudyStore::new(dir.path().join("nested").join("studies"));
        let study = import_study("1. e4 e5").unwrap();

        let id = store.save(&study, None).await.unwrap();
        assert!(store.exists(&id).await.unwrap());
        assert_eq!(store.load(&id).await.unwrap(), study);
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = StudyStore::new(dir.path());
        let id = store.save(&StudyFile::default(), Some("lesson-1")).await.unwrap();
        assert_eq!(id, "lesson-1");

        let study = import_study("1. d4").unwrap();
        store.save(&study, Some("lesson-1")).await.unwrap();
        assert_eq!(store.load("lesson-1").await.unwrap().moves.len(), 1);
        assert!(!dir.path().join("lesson-1.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_and_invalid_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = StudyStore::new(dir.path());
        assert!(matches!(store.load("nope").await, Err(StoreError::NotFound(_))));
        assert!(!store.exists("nope").await.unwrap());
        assert!(matches!(store.load("../etc/passwd").await, Err(StoreError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_load_upgrades_legacy_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.json"), r#"{"version": "0.0.1", "moves": []}"#).unwrap();
        let study = StudyStore::new(dir.path()).load("old").await.unwrap();
        assert_eq!(study.version, study_core::model::CURRENT_STORAGE_VERSION);
        assert_eq!(study.root_fen, study_core::model::STANDARD_START_FEN);
    }
}
