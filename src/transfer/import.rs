//! Import pipeline
//!
//! ```text
//! ImportFile::read ──► needs_password? ──► unlock(password) ──► UnlockedImport
//!   (read + decode)                        (derive + open all)      │
//!                                                                    ▼
//!                                            DataStore::apply_import(mode)
//! ```
//!
//! Every stage consumes the previous one, so a file that failed to unlock
//! cannot reach the store. Nothing here borrows the store: a caller can wait
//! on a password prompt for as long as it likes.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Serialize;
use std::path::Path;

use crate::config::codec;
use crate::config::types::ShuttleData;

use super::crypto::derive_key;
use super::error::TransferError;
use super::secrets::{has_sealed_secrets, unseal_secrets};

/// How an imported document is reconciled with the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// Overwrite the store with the file contents
    Replace,
    /// Add providers, projects and elements the store does not have yet
    Merge,
}

/// Summary shown before the mode choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub providers: usize,
    pub projects: usize,
    pub elements: usize,
    /// File holds sealed sudo passwords
    pub encrypted: bool,
}

impl ImportPreview {
    fn of(data: &ShuttleData) -> Self {
        Self {
            providers: data.providers.len(),
            projects: data.providers.iter().map(|p| p.projects.len()).sum(),
            elements: data.elements().count(),
            encrypted: has_sealed_secrets(data),
        }
    }
}

/// Interactive side of an import.
///
/// Both prompts may take arbitrarily long. `None` cancels the import.
#[async_trait]
pub trait ImportPrompt: Send + Sync {
    /// Ask for the export password. Only called when the file has sealed secrets.
    async fn password(&self) -> Option<String>;

    /// Ask how to apply the file
    async fn choose_mode(&self, preview: &ImportPreview) -> Option<ImportMode>;
}

/// A decoded import file, secrets possibly still sealed
#[derive(Debug)]
pub struct ImportFile {
    document: ShuttleData,
}

impl ImportFile {
    /// Read and decode an import file
    pub async fn read(path: &Path) -> Result<Self, TransferError> {
        let bytes = tokio::fs::read(path).await?;
        tracing::info!("Read import file {:?} ({} bytes)", path, bytes.len());
        Self::from_bytes(&bytes)
    }

    /// Decode an import file already in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransferError> {
        let document = codec::decode(bytes)?;
        Ok(Self { document })
    }

    /// Whether [`ImportFile::unlock`] needs a password
    pub fn needs_password(&self) -> bool {
        has_sealed_secrets(&self.document)
    }

    pub fn preview(&self) -> ImportPreview {
        ImportPreview::of(&self.document)
    }

    /// Decoded export salt.
    ///
    /// `Ok(None)` when nothing is sealed; `MissingSalt` when secrets are sealed
    /// but the file has no usable salt, which no password can fix.
    pub fn salt(&self) -> Result<Option<Vec<u8>>, TransferError> {
        if !self.needs_password() {
            return Ok(None);
        }

        self.document
            .export_salt
            .as_deref()
            .and_then(|s| BASE64.decode(s.trim()).ok())
            .filter(|s| !s.is_empty())
            .map(Some)
            .ok_or(TransferError::MissingSalt)
    }

    /// Open all sealed secrets. All or nothing: any field failing to open
    /// fails the whole file.
    ///
    /// The password is ignored for files without sealed secrets. An empty
    /// password counts as none.
    pub fn unlock(self, password: Option<&str>) -> Result<UnlockedImport, TransferError> {
        let mut document = match self.salt()? {
            Some(salt) => {
                let password = password
                    .filter(|p| !p.is_empty())
                    .ok_or(TransferError::PasswordRequired)?;

                let key = derive_key(password, &salt);
                unseal_secrets(self.document, &key)?
            }
            None => self.document,
        };

        // Only meaningful inside the file
        document.export_salt = None;

        Ok(UnlockedImport { document })
    }
}

/// An import file with every secret in plaintext, ready to apply
#[derive(Debug)]
pub struct UnlockedImport {
    document: ShuttleData,
}

impl UnlockedImport {
    pub fn preview(&self) -> ImportPreview {
        ImportPreview::of(&self.document)
    }

    pub fn document(&self) -> &ShuttleData {
        &self.document
    }

    pub fn into_document(self) -> ShuttleData {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{AppSettings, Element, Project, Provider};
    use crate::transfer::crypto::generate_salt;
    use crate::transfer::secrets::seal_secrets;

    fn sealed_file(password: &str) -> Vec<u8> {
        let mut project = Project::new("Web", None);
        project
            .elements
            .push(Element::new("db1", "root", "10.0.0.5").with_sudo_password("secret"));
        project.elements.push(Element::new("web1", "root", "10.0.0.6"));
        let mut provider = Provider::new("Acme");
        provider.projects.push(project);
        let mut data = ShuttleData::new(vec![provider], AppSettings::default());

        let salt = generate_salt();
        seal_secrets(&mut data, &derive_key(password, &salt)).unwrap();
        data.export_salt = Some(BASE64.encode(salt));

        codec::encode_export(&data).unwrap()
    }

    #[test]
    fn test_preview() {
        let file = ImportFile::from_bytes(&sealed_file("hunter2")).unwrap();

        assert!(file.needs_password());
        assert_eq!(
            file.preview(),
            ImportPreview {
                providers: 1,
                projects: 1,
                elements: 2,
                encrypted: true,
            }
        );
    }

    #[test]
    fn test_unlock_with_password() {
        let file = ImportFile::from_bytes(&sealed_file("hunter2")).unwrap();

        let unlocked = file.unlock(Some("hunter2")).unwrap();
        let doc = unlocked.document();
        let first = doc.elements().next().unwrap();
        assert_eq!(first.sudo_password.as_deref(), Some("secret"));
        assert!(doc.export_salt.is_none());
        assert!(!unlocked.preview().encrypted);
    }

    #[test]
    fn test_unlock_without_password() {
        let file = ImportFile::from_bytes(&sealed_file("hunter2")).unwrap();
        assert!(matches!(file.unlock(None), Err(TransferError::PasswordRequired)));

        let file = ImportFile::from_bytes(&sealed_file("hunter2")).unwrap();
        assert!(matches!(file.unlock(Some("")), Err(TransferError::PasswordRequired)));
    }

    #[test]
    fn test_unlock_wrong_password() {
        let file = ImportFile::from_bytes(&sealed_file("hunter2")).unwrap();
        assert!(matches!(
            file.unlock(Some("hunter3")),
            Err(TransferError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_unlock_missing_salt() {
        let mut data = codec::decode(&sealed_file("hunter2")).unwrap();
        data.export_salt = None;
        let bytes = codec::encode_export(&data).unwrap();

        let file = ImportFile::from_bytes(&bytes).unwrap();
        assert!(matches!(file.unlock(Some("hunter2")), Err(TransferError::MissingSalt)));
    }

    #[test]
    fn test_plaintext_file_ignores_password() {
        let mut provider = Provider::new("Acme");
        provider.projects.push(Project::new("Web", None));
        let data = ShuttleData::new(vec![provider], AppSettings::default());
        let bytes = codec::encode_export(&data).unwrap();

        let file = ImportFile::from_bytes(&bytes).unwrap();
        assert!(!file.needs_password());
        assert_eq!(file.unlock(Some("anything")).unwrap().into_document(), data);
    }

    #[test]
    fn test_invalid_file() {
        let result = ImportFile::from_bytes(b"<html>");
        assert!(matches!(result, Err(TransferError::InvalidFormat(_))));
    }
}
