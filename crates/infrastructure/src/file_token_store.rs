use std::io::ErrorKind;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use rentdesk_application::TokenStore;
use rentdesk_core::{AppError, AppResult};

#[cfg(unix)]
const OWNER_ONLY_MODE: u32 = 0o600;

/// Token store backed by a single file readable only by its owner.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Creates a store that keeps the token at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(AppError::Internal(format!(
                "failed to read token file '{}': {error}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, token: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create token directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let write_error = |error: std::io::Error| {
            AppError::Internal(format!(
                "failed to write token file '{}': {error}",
                self.path.display()
            ))
        };

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(OWNER_ONLY_MODE);

        let mut file = options.open(&self.path).await.map_err(write_error)?;
        // Mode only applies on creation; narrow files left by older writes.
        #[cfg(unix)]
        file.set_permissions(std::fs::Permissions::from_mode(OWNER_ONLY_MODE))
            .await
            .map_err(write_error)?;
        file.write_all(token.as_bytes())
            .await
            .map_err(write_error)?;
        file.flush().await.map_err(write_error)
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Internal(format!(
                "failed to remove token file '{}': {error}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use rentdesk_application::TokenStore;
    use uuid::Uuid;

    use super::FileTokenStore;

    #[tokio::test]
    async fn save_load_and_clear_token() {
        let directory = std::env::temp_dir().join(format!("rentdesk-{}", Uuid::new_v4()));
        let store = FileTokenStore::new(directory.join("nested").join("token"));

        assert_eq!(store.load().await.ok(), Some(None));
        assert!(store.save("abc.def.ghi").await.is_ok());
        assert_eq!(
            store.load().await.ok().flatten().as_deref(),
            Some("abc.def.ghi")
        );

        assert!(store.clear().await.is_ok());
        assert!(store.clear().await.is_ok());
        assert_eq!(store.load().await.ok(), Some(None));

        let _ = tokio::fs::remove_dir_all(directory).await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn saved_token_is_readable_by_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let directory = std::env::temp_dir().join(format!("rentdesk-{}", Uuid::new_v4()));
        let path = directory.join("token");
        assert!(tokio::fs::create_dir_all(&directory).await.is_ok());
        assert!(tokio::fs::write(&path, "stale").await.is_ok());
        assert!(
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))
                .await
                .is_ok()
        );

        let store = FileTokenStore::new(path.clone());
        assert!(store.save("abc.def.ghi").await.is_ok());

        let mode = tokio::fs::metadata(&path)
            .await
            .map(|metadata| metadata.permissions().mode() & 0o777)
            .ok();
        assert_eq!(mode, Some(0o600));
        assert_eq!(
            store.load().await.ok().flatten().as_deref(),
            Some("abc.def.ghi")
        );

        let _ = tokio::fs::remove_dir_all(directory).await;
    }
}
