//! Error types for export/import operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("File contains encrypted secrets but no valid export salt")]
    MissingSalt,

    #[error("File contains encrypted secrets; a password is required")]
    PasswordRequired,

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed (wrong password or corrupted data)")]
    DecryptionFailed,

    #[error("Operation cancelled")]
    Cancelled,
}
