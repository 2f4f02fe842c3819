//! Durable storage for the bearer credential.
//!
//! A single key holds the token; an absent key means logged out.

use crate::error::ClientError;
use crate::models::Credential;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Loads the stored credential, if any.
    async fn load(&self) -> Result<Option<Credential>, ClientError>;

    /// Persists the credential, replacing any previous one.
    async fn save(&self, credential: &Credential) -> Result<(), ClientError>;

    /// Removes the stored credential. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Stores the token in a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, ClientError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let credential = Credential::new(contents.trim());
                Ok((!credential.is_empty()).then_some(credential))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to read credential");
                Err(ClientError::Storage(e))
            }
        }
    }

    async fn save(&self, credential: &Credential) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, credential.expose()).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(e)),
        }
    }
}

/// In-memory storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: std::sync::RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: std::sync::RwLock::new(Some(Credential::new(token))),
        }
    }

    /// Current contents, bypassing the async trait.
    pub fn stored(&self) -> Option<Credential> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, ClientError> {
        Ok(self.stored())
    }

    async fn save(&self, credential: &Credential) -> Result<(), ClientError> {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(credential.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("token"));

        assert!(store.load().await.unwrap().is_none());

        store.save(&Credential::new("abc.def.ghi")).await.unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.expose(), "abc.def.ghi");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clearing_twice_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("token"));

        store.clear().await.unwrap();
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn blank_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "\n").unwrap();

        let store = FileCredentialStore::new(path);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_with_token() {
        let store = MemoryCredentialStore::with_token("tok");
        assert_eq!(store.load().await.unwrap().unwrap().expose(), "tok");

        store.clear().await.unwrap();
        assert!(store.stored().is_none());
    }
}
