use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::chat::ChatMessage;
use crate::error::StorageError;
use crate::session::Session;
use crate::surface::Surface;

/// Durable string key-value store backing a session.
pub trait SessionStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let final_path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));

        fs::write(&tmp_path, value)?;
        match fs::rename(&tmp_path, &final_path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if final_path.exists() {
                    fs::remove_file(&final_path)?;
                    fs::rename(&tmp_path, &final_path)?;
                    Ok(())
                } else {
                    Err(rename_err.into())
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Load a surface's session, seeding a fresh one when nothing usable is stored.
///
/// Unreadable entries are logged and skipped.
pub fn load_session<S: Surface>(storage: &dyn SessionStorage) -> Session<S> {
    let messages: Vec<ChatMessage> = read_entry(storage, S::MESSAGES_KEY).unwrap_or_default();
    let state: Option<S> = read_entry(storage, S::STATE_KEY);
    Session::hydrate(messages, state)
}

fn read_entry<T: serde::de::DeserializeOwned>(storage: &dyn SessionStorage, key: &str) -> Option<T> {
    let raw = match storage.load(key) {
        Ok(raw) => raw?,
        Err(e) => {
            log::error!("failed to read {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("failed to parse stored {}: {}", key, e);
            None
        }
    }
}

/// Write messages and state under the surface's keys. A state that is not
/// persistable (an app with no files) leaves the stored state as it was.
pub fn save_session<S: Surface>(storage: &dyn SessionStorage, session: &Session<S>) -> Result<(), StorageError> {
    if !session.messages().is_empty() {
        storage.save(S::MESSAGES_KEY, &serde_json::to_string(session.messages())?)?;
    }
    if session.state().is_persistable() {
        storage.save(S::STATE_KEY, &serde_json::to_string(session.state())?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Sender;
    use crate::project::{AppProject, ElementDesign};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.load("nothing").unwrap().is_none());
    }

    #[test]
    fn memory_storage_writes_through_poisoned_lock() {
        let storage = std::sync::Arc::new(MemoryStorage::new());
        let holder = storage.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.entries.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(storage.entries.is_poisoned());

        storage.save("k", "v").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn file_storage_overwrites() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path().join("sessions"));
        storage.save("k", "one").unwrap();
        storage.save("k", "two").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("two"));
        assert!(!dir.path().join("sessions").join("k.json.tmp").exists());
    }

    #[test]
    fn session_round_trips_through_files() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path());

        let mut session = Session::<ElementDesign>::new();
        session.add_message("a card with an image", Sender::User);
        session.set_state(ElementDesign::new("<div class=\"card\"></div>", ".card{}", ""));
        session.add_message("created", Sender::Assistant);
        save_session(&storage, &session).unwrap();

        let loaded: Session<ElementDesign> = load_session(&storage);
        assert_eq!(loaded.messages(), session.messages());
        assert_eq!(loaded.state(), session.state());
        assert_eq!(loaded.checkpoint_ids().len(), 2);
    }

    #[test]
    fn corrupt_entries_fall_back_to_fresh_session() {
        let storage = MemoryStorage::new();
        storage.save(AppProject::MESSAGES_KEY, "not json").unwrap();
        let session: Session<AppProject> = load_session(&storage);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.state(), &AppProject::starter());
    }

    #[test]
    fn empty_project_is_not_saved() {
        let storage = MemoryStorage::new();
        let mut session = Session::<AppProject>::new();
        save_session(&storage, &session).unwrap();

        session.set_state(AppProject { files: Vec::new(), ..AppProject::starter() });
        save_session(&storage, &session).unwrap();

        let stored: AppProject = serde_json::from_str(&storage.get(AppProject::STATE_KEY).unwrap()).unwrap();
        assert_eq!(stored, AppProject::starter());
    }
}
