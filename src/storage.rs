//! Client-side key-value storage and session persistence.
//!
//! A session lives in exactly one of two scopes: `Durable` survives restarts
//! (a JSON file on disk), `Ephemeral` lasts only as long as the process.
//! Persisting into one scope always clears the other.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    error::{AppError, AppResult},
    models::{Session, User},
};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    Durable,
    Ephemeral,
}

impl StorageScope {
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            StorageScope::Durable
        } else {
            StorageScope::Ephemeral
        }
    }

    pub fn other(self) -> Self {
        match self {
            StorageScope::Durable => StorageScope::Ephemeral,
            StorageScope::Ephemeral => StorageScope::Durable,
        }
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove(&self, key: &str) -> AppResult<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> AppResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("storage lock poisoned")))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// Flat JSON object on disk. The whole file is rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> AppResult<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => Ok(entries),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        path = %self.path.display(),
                        "storage file is corrupt; starting empty"
                    );
                    Ok(HashMap::new())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, entries: &HashMap<String, String>) -> AppResult<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = lock(&self.guard)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = lock(&self.guard)?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let _guard = lock(&self.guard)?;
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SessionPersistence {
    durable: Arc<dyn KeyValueStore>,
    ephemeral: Arc<dyn KeyValueStore>,
}

impl SessionPersistence {
    pub fn new(durable: Arc<dyn KeyValueStore>, ephemeral: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, ephemeral }
    }

    /// Durable storage in `path`, ephemeral storage in memory.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStore::new(path)), Arc::new(MemoryStore::new()))
    }

    /// Both scopes in memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    pub fn store(&self, scope: StorageScope) -> &dyn KeyValueStore {
        match scope {
            StorageScope::Durable => self.durable.as_ref(),
            StorageScope::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    pub fn persist(&self, scope: StorageScope, session: &Session) -> AppResult<()> {
        let user = serde_json::to_string(&session.user)?;
        let target = self.store(scope);
        target.set(TOKEN_KEY, &session.token)?;
        target.set(USER_KEY, &user)?;
        self.clear_scope(scope.other())
    }

    /// Session from durable storage, else ephemeral storage. A scope only
    /// counts when it holds both a token and a readable user.
    pub fn restore(&self) -> AppResult<Option<(StorageScope, Session)>> {
        for scope in [StorageScope::Durable, StorageScope::Ephemeral] {
            if let Some(session) = self.load(scope)? {
                return Ok(Some((scope, session)));
            }
        }
        Ok(None)
    }

    /// A scope that cannot be read or parsed counts as holding no session.
    pub fn load(&self, scope: StorageScope) -> AppResult<Option<Session>> {
        let store = self.store(scope);
        let (token, raw_user) = match (store.get(TOKEN_KEY), store.get(USER_KEY)) {
            (Ok(Some(token)), Ok(Some(raw_user))) => (token, raw_user),
            (Ok(_), Ok(_)) => return Ok(None),
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, ?scope, "stored session is unreadable; ignoring");
                return Ok(None);
            }
        };
        if token.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => Ok(Some(Session { user, token })),
            Err(err) => {
                tracing::warn!(error = %err, ?scope, "stored user is unreadable; ignoring");
                Ok(None)
            }
        }
    }

    pub fn clear_scope(&self, scope: StorageScope) -> AppResult<()> {
        let store = self.store(scope);
        store.remove(TOKEN_KEY)?;
        store.remove(USER_KEY)
    }

    pub fn clear(&self) -> AppResult<()> {
        self.clear_scope(StorageScope::Durable)?;
        self.clear_scope(StorageScope::Ephemeral)
    }
}
