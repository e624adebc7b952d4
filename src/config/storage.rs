//! Store File Storage
//!
//! Handles reading/writing the connection book to disk.
//! Location: the per-user data directory (`~/Library/Application Support/Shuttle`
//! on macOS, `$XDG_DATA_HOME/Shuttle` on Linux, `%APPDATA%\Shuttle` on Windows).

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::codec;
use super::types::ShuttleData;

/// Directory name under the platform data dir
const APP_DIR_NAME: &str = "Shuttle";

/// Store file name
const STORE_FILE_NAME: &str = "shuttle_data.json";

/// Store file storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to determine data directory")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid store file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Get the application data directory
pub fn data_dir() -> Result<PathBuf, StorageError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(StorageError::NoDataDir)
}

/// Get the store file path
pub fn store_file() -> Result<PathBuf, StorageError> {
    Ok(data_dir()?.join(STORE_FILE_NAME))
}

/// Write `bytes` to `path` atomically: temp file, fsync, rename.
///
/// Readers see either the previous file or the complete new one. On unix the
/// temp file is created owner-only, so the contents are never readable by
/// others, not even before the rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    // A leftover temp file would keep its old mode
    let _ = fs::remove_file(&temp_path).await;

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(&temp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(e);
    }

    Ok(())
}

/// Store file manager
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Create a new storage manager with default path
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self {
            path: store_file()?,
        })
    }

    /// Create storage manager with custom path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the document from disk.
    ///
    /// `Ok(None)` if the file does not exist yet. A file that exists but
    /// cannot be read or decoded is copied aside first (when possible) so a
    /// later save cannot overwrite the only copy.
    pub async fn load(&self) -> Result<Option<ShuttleData>, StorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::error!("Failed to read store file {:?}: {}", self.path, e);
                self.backup_unusable().await;
                return Err(StorageError::Io(e));
            }
        };

        match codec::decode(&bytes) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                tracing::warn!("Store file corrupted: {}", e);
                self.backup_unusable().await;
                Err(StorageError::Format(e))
            }
        }
    }

    async fn backup_unusable(&self) {
        match self.backup().await {
            Ok(backup_path) => {
                tracing::warn!("Unusable store backed up to {:?}", backup_path);
            }
            Err(backup_err) => {
                tracing::error!(
                    "Failed to backup store {:?}: {}",
                    self.path,
                    backup_err
                );
            }
        }
    }

    /// Save the document to disk
    pub async fn save(&self, data: &ShuttleData) -> Result<(), StorageError> {
        let bytes = codec::encode(data)?;
        write_atomic(&self.path, &bytes).await?;

        // Holds plaintext sudo passwords
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = fs::set_permissions(&self.path, perms).await {
                tracing::warn!("Failed to restrict store file permissions: {}", e);
            }
        }

        Ok(())
    }

    /// Check if store file exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Get store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a backup of the current store file
    pub async fn backup(&self) -> Result<PathBuf, StorageError> {
        let backup_path = self.path.with_extension(format!(
            "json.backup.{}",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        ));

        if self.exists().await {
            fs::copy(&self.path, &backup_path).await?;
        }

        Ok(backup_path)
    }
}
