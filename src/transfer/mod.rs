//! Export / Import
//!
//! Export files share the store's JSON layout. When the user picks a
//! password, each sudo password is sealed individually (`enc:` prefix) and
//! the document carries the base64 `exportSalt` needed to derive the key.

pub mod crypto;
pub mod error;
pub mod export;
pub mod import;
pub mod secrets;

pub use crypto::{decrypt_field, derive_key, encrypt_field, generate_salt, FieldKey};
pub use error::TransferError;
pub use export::{build_export, write_export};
pub use import::{ImportFile, ImportMode, ImportPreview, ImportPrompt, UnlockedImport};
pub use secrets::{has_sealed_secrets, sanitize_secrets, ENC_PREFIX, LEGACY_PREFIX};
