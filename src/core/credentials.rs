//! Plaintext username registry persisted as one JSON blob.
//!
//! This is a convenience for remembering who is at the terminal, not a
//! security boundary: passwords are stored and compared as-is.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

pub const USERS_FILE: &str = "quant-optik-users.json";
pub const DATA_DIR_ENV: &str = "QUANTOPTIK_DATA_DIR";
pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub password: String,
    #[serde(default)]
    pub preferences: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug)]
pub enum CredentialError {
    UsernameTaken,
    TooShort,
    InvalidCredentials,
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Write {
        path: PathBuf,
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::UsernameTaken => write!(f, "Username taken"),
            CredentialError::TooShort => write!(
                f,
                "Username ({MIN_USERNAME_LEN}+) and password ({MIN_PASSWORD_LEN}+) too short"
            ),
            CredentialError::InvalidCredentials => write!(f, "Invalid credentials"),
            CredentialError::Read { path, source } => {
                write!(f, "Failed to read users at {}: {}", path.display(), source)
            }
            CredentialError::Parse { path, source } => {
                write!(f, "Failed to parse users at {}: {}", path.display(), source)
            }
            CredentialError::Write { path, source } => {
                write!(f, "Failed to save users to {}: {}", path.display(), source)
            }
        }
    }
}

impl StdError for CredentialError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CredentialError::Read { source, .. } => Some(source),
            CredentialError::Parse { source, .. } => Some(source),
            CredentialError::Write { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct CredentialStore {
    path: Option<PathBuf>,
    users: BTreeMap<String, CredentialRecord>,
}

impl CredentialStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store backing `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let users: BTreeMap<String, CredentialRecord> = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| CredentialError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&contents).map_err(|source| CredentialError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), users = users.len(), "Loaded credential store");
        Ok(Self {
            path: Some(path),
            users,
        })
    }

    /// `$QUANTOPTIK_DATA_DIR/quant-optik-users.json`, else the platform data dir.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return Some(PathBuf::from(dir).join(USERS_FILE));
        }
        ProjectDirs::from("org", "quantoptik", "quantoptik")
            .map(|dirs| dirs.data_dir().join(USERS_FILE))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, username: &str) -> Option<&CredentialRecord> {
        self.users.get(username)
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<(), CredentialError> {
        if self.users.contains_key(username) {
            return Err(CredentialError::UsernameTaken);
        }
        if username.chars().count() < MIN_USERNAME_LEN
            || password.chars().count() < MIN_PASSWORD_LEN
        {
            return Err(CredentialError::TooShort);
        }

        self.users.insert(
            username.to_string(),
            CredentialRecord {
                password: password.to_string(),
                preferences: serde_json::Map::new(),
            },
        );
        if let Err(err) = self.save() {
            self.users.remove(username);
            return Err(err);
        }
        debug!(username, "Registered user");
        Ok(())
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        match self.users.get(username) {
            Some(record) if record.password == password => Ok(()),
            _ => Err(CredentialError::InvalidCredentials),
        }
    }

    fn save(&self) -> Result<(), CredentialError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_atomically(path, &self.users).map_err(|source| CredentialError::Write {
            path: path.clone(),
            source,
        })
    }
}

fn write_atomically(
    path: &Path,
    users: &BTreeMap<String, CredentialRecord>,
) -> Result<(), Box<dyn StdError + Send + Sync>> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir)?;
    }

    let contents = serde_json::to_string(users)?;
    let mut temp_file = match parent {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    temp_file.write_all(contents.as_bytes())?;
    temp_file.as_file_mut().sync_all()?;
    temp_file.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_an_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = CredentialStore::open(temp_dir.path().join(USERS_FILE)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn short_username_is_rejected() {
        let mut store = CredentialStore::in_memory();
        let err = store.register("ab", "longenoughpassword").unwrap_err();
        assert_eq!(err.to_string(), "Username (3+) and password (6+) too short");
        assert!(store.is_empty());
    }

    #[test]
    fn short_password_is_rejected() {
        let mut store = CredentialStore::in_memory();
        let err = store.register("alice", "12345").unwrap_err();
        assert!(matches!(err, CredentialError::TooShort));
    }

    #[test]
    fn minimum_lengths_register_and_persist() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(USERS_FILE);
        let mut store = CredentialStore::open(&path).unwrap();
        assert_eq!(store.path(), Some(path.as_path()));

        store.register("bob", "123456").unwrap();
        assert!(store.verify("bob", "123456").is_ok());

        let reloaded = CredentialStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        let record = reloaded.get("bob").unwrap();
        assert_eq!(record.password, "123456");
        assert!(record.preferences.is_empty());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["bob"]["password"], "123456");
        assert!(raw["bob"]["preferences"].as_object().unwrap().is_empty());
    }

    #[test]
    fn duplicate_username_is_taken() {
        let mut store = CredentialStore::in_memory();
        store.register("carol", "secret1").unwrap();
        let err = store.register("carol", "secret2").unwrap_err();
        assert_eq!(err.to_string(), "Username taken");
        assert!(store.verify("carol", "secret1").is_ok());
    }

    #[test]
    fn duplicate_check_runs_before_length_check() {
        let mut store = CredentialStore::in_memory();
        store.register("dan", "secret1").unwrap();
        assert!(matches!(
            store.register("dan", "x"),
            Err(CredentialError::UsernameTaken)
        ));
    }

    #[test]
    fn unknown_user_is_invalid_regardless_of_password() {
        let store = CredentialStore::in_memory();
        assert!(store.path().is_none());
        for password in ["", "123456", "anything at all"] {
            let err = store.verify("ghost", password).unwrap_err();
            assert_eq!(err.to_string(), "Invalid credentials");
        }
    }

    #[test]
    fn wrong_password_is_invalid() {
        let mut store = CredentialStore::in_memory();
        store.register("erin", "correct-horse").unwrap();
        assert!(matches!(
            store.verify("erin", "battery-staple"),
            Err(CredentialError::InvalidCredentials)
        ));
    }

    #[test]
    fn corrupt_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(USERS_FILE);
        fs::write(&path, "{not json").unwrap();

        let err = CredentialStore::open(&path).unwrap_err();
        assert!(matches!(err, CredentialError::Parse { .. }));
        assert!(err.to_string().contains(USERS_FILE));
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let mut store = CredentialStore::in_memory();
        assert!(store.register("λμν", "ψψψψψψ").is_ok());
    }
}
