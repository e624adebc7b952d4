//! Export file writing

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::Path;

use crate::config::codec;
use crate::config::storage::write_atomic;
use crate::config::types::ShuttleData;

use super::crypto::{derive_key, generate_salt};
use super::error::TransferError;
use super::secrets::seal_secrets;

/// Build the document to export from the live one.
///
/// With a password, every non-empty sudo password is sealed under a key
/// derived from a fresh salt and the salt is stored in the document.
/// Without one, secrets go out in plaintext and no salt is written.
pub fn build_export(live: &ShuttleData, password: Option<&str>) -> Result<ShuttleData, TransferError> {
    let mut export = live.clone();
    export.export_salt = None;

    if let Some(password) = password.filter(|p| !p.is_empty()) {
        let salt = generate_salt();
        let key = derive_key(password, &salt);

        let sealed = seal_secrets(&mut export, &key)?;
        export.export_salt = Some(BASE64.encode(salt));
        tracing::debug!("Sealed {} secrets for export", sealed);
    } else {
        tracing::warn!("Exporting without password; sudo passwords are written in plaintext");
    }

    Ok(export)
}

/// Encode an export document and write it atomically to `path`
pub async fn write_export(path: &Path, export: &ShuttleData) -> Result<(), TransferError> {
    let bytes = codec::encode_export(export)?;
    write_atomic(path, &bytes).await?;
    Ok(())
}
