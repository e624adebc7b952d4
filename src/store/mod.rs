//! Data Store
//!
//! Owns the live [`ShuttleData`] and its backing file. Every mutating call
//! persists before it returns; mutating methods take `&mut self`, so two
//! writes can never interleave and a write always follows its mutation.
//!
//! Persistence failures on ordinary edits are logged and absorbed: the app
//! keeps running on the in-memory state. Use [`DataStore::flush`] when the
//! caller needs to know. Export and import are user-initiated and return
//! their errors.

pub mod merge;
pub mod search;

use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::{
    AppSettings, ConfigStorage, Element, Project, Provider, ShuttleData, StorageError, TerminalApp,
};
use crate::launch::{ConnectionDescriptor, TerminalLauncher};
use crate::transfer::{
    build_export, sanitize_secrets, write_export, ImportFile, ImportMode, ImportPrompt,
    TransferError, UnlockedImport,
};

pub use merge::{merge, merge_providers, MergeStats};
pub use search::{search, SearchHit};

/// Outcome of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub mode: ImportMode,
    /// Entities that are new to the store (everything, for Replace)
    pub added: MergeStats,
}

/// The connection book
pub struct DataStore {
    storage: ConfigStorage,
    data: ShuttleData,
}

impl DataStore {
    /// Open the store at the default location and load it
    pub async fn open() -> Result<Self, StorageError> {
        Ok(Self::open_with(ConfigStorage::new()?).await)
    }

    /// Open the store backed by `path` and load it.
    ///
    /// A missing or unreadable file leaves the store empty.
    pub async fn open_at(path: PathBuf) -> Self {
        Self::open_with(ConfigStorage::with_path(path)).await
    }

    async fn open_with(storage: ConfigStorage) -> Self {
        let mut store = Self::with_storage(storage);
        if let Err(e) = store.load().await {
            tracing::error!(
                "Failed to load store {:?}, starting empty: {}",
                store.path(),
                e
            );
        }
        store
    }

    /// Empty store over `storage`, nothing read yet
    pub fn with_storage(storage: ConfigStorage) -> Self {
        Self {
            storage,
            data: ShuttleData::default(),
        }
    }

    /// Replace the in-memory document with the backing file's contents.
    ///
    /// On failure the document is left empty and the error returned.
    pub async fn load(&mut self) -> Result<(), StorageError> {
        self.data = ShuttleData::default();

        if let Some(mut data) = self.storage.load().await? {
            data.export_salt = None;
            tracing::info!(
                "Loaded store: {} providers, {} elements",
                data.providers.len(),
                data.elements().count()
            );
            self.data = data;
        }

        Ok(())
    }

    /// Sanitize and write the document, reporting failure
    pub async fn flush(&mut self) -> Result<(), StorageError> {
        let cleared = sanitize_secrets(&mut self.data);
        if cleared > 0 {
            tracing::warn!("Dropped {} sudo passwords that were still encrypted", cleared);
        }
        self.data.export_salt = None;

        self.storage.save(&self.data).await
    }

    /// Sanitize and write the document, logging failure
    pub async fn persist(&mut self) {
        if let Err(e) = self.flush().await {
            tracing::error!("Failed to save store to {:?}: {}", self.storage.path(), e);
        }
    }

    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    pub fn data(&self) -> &ShuttleData {
        &self.data
    }

    pub fn providers(&self) -> &[Provider] {
        &self.data.providers
    }

    pub fn settings(&self) -> &AppSettings {
        &self.data.settings
    }

    pub fn provider(&self, provider_id: Uuid) -> Option<&Provider> {
        self.data.providers.iter().find(|p| p.id == provider_id)
    }

    pub fn project(&self, provider_id: Uuid, project_id: Uuid) -> Option<&Project> {
        self.provider(provider_id)?
            .projects
            .iter()
            .find(|p| p.id == project_id)
    }

    pub fn element(&self, provider_id: Uuid, project_id: Uuid, element_id: Uuid) -> Option<&Element> {
        self.project(provider_id, project_id)?
            .elements
            .iter()
            .find(|e| e.id == element_id)
    }

    fn provider_mut(&mut self, provider_id: Uuid) -> Option<&mut Provider> {
        self.data.providers.iter_mut().find(|p| p.id == provider_id)
    }

    fn project_mut(&mut self, provider_id: Uuid, project_id: Uuid) -> Option<&mut Project> {
        self.provider_mut(provider_id)?
            .projects
            .iter_mut()
            .find(|p| p.id == project_id)
    }

    // ── Settings ────────────────────────────────────────────────────────────

    pub async fn update_terminal(&mut self, terminal: TerminalApp) {
        self.data.settings.terminal_app = terminal;
        self.persist().await;
    }

    pub async fn update_custom_terminal_path(&mut self, path: Option<String>) {
        self.data.settings.custom_terminal_path = path;
        self.persist().await;
    }

    pub async fn update_copy_sudo_on_connect(&mut self, value: bool) {
        self.data.settings.copy_sudo_on_connect = value;
        self.persist().await;
    }

    // ── Providers ───────────────────────────────────────────────────────────

    /// Append a provider; returns its new id
    pub async fn add_provider(&mut self, name: impl Into<String>) -> Uuid {
        let provider = Provider::new(name);
        let id = provider.id;
        self.data.providers.push(provider);
        self.persist().await;
        id
    }

    pub async fn update_provider(&mut self, provider_id: Uuid, name: impl Into<String>) {
        let Some(provider) = self.provider_mut(provider_id) else {
            tracing::debug!("update_provider: provider {} not found", provider_id);
            return;
        };
        provider.name = name.into();
        self.persist().await;
    }

    pub async fn delete_provider(&mut self, provider_id: Uuid) {
        let before = self.data.providers.len();
        self.data.providers.retain(|p| p.id != provider_id);
        if self.data.providers.len() == before {
            tracing::debug!("delete_provider: provider {} not found", provider_id);
            return;
        }
        self.persist().await;
    }

    // ── Projects ────────────────────────────────────────────────────────────

    /// Append a project to a provider; `None` if the provider does not exist
    pub async fn add_project(
        &mut self,
        provider_id: Uuid,
        name: impl Into<String>,
        url: Option<String>,
    ) -> Option<Uuid> {
        let Some(provider) = self.provider_mut(provider_id) else {
            tracing::debug!("add_project: provider {} not found", provider_id);
            return None;
        };
        let project = Project::new(name, url);
        let id = project.id;
        provider.projects.push(project);
        self.persist().await;
        Some(id)
    }

    pub async fn update_project(
        &mut self,
        provider_id: Uuid,
        project_id: Uuid,
        name: impl Into<String>,
        url: Option<String>,
    ) {
        let Some(project) = self.project_mut(provider_id, project_id) else {
            tracing::debug!("update_project: project {} not found", project_id);
            return;
        };
        project.name = name.into();
        project.url = url;
        self.persist().await;
    }

    pub async fn delete_project(&mut self, provider_id: Uuid, project_id: Uuid) {
        let Some(provider) = self.provider_mut(provider_id) else {
            tracing::debug!("delete_project: provider {} not found", provider_id);
            return;
        };
        let before = provider.projects.len();
        provider.projects.retain(|p| p.id != project_id);
        if provider.projects.len() == before {
            return;
        }
        self.persist().await;
    }

    // ── Elements ────────────────────────────────────────────────────────────

    /// Append an element to a project under a fresh id; `None` if the
    /// provider or project does not exist
    pub async fn add_element(
        &mut self,
        provider_id: Uuid,
        project_id: Uuid,
        mut element: Element,
    ) -> Option<Uuid> {
        let Some(project) = self.project_mut(provider_id, project_id) else {
            tracing::debug!("add_element: project {} not found", project_id);
            return None;
        };
        element.id = Uuid::new_v4();
        let id = element.id;
        project.elements.push(element);
        self.persist().await;
        Some(id)
    }

    /// Replace the element with the same id, keeping its position
    pub async fn update_element(&mut self, provider_id: Uuid, project_id: Uuid, element: Element) {
        let Some(slot) = self
            .project_mut(provider_id, project_id)
            .and_then(|p| p.elements.iter_mut().find(|e| e.id == element.id))
        else {
            tracing::debug!("update_element: element {} not found", element.id);
            return;
        };
        *slot = element;
        self.persist().await;
    }

    pub async fn delete_element(&mut self, provider_id: Uuid, project_id: Uuid, element_id: Uuid) {
        let Some(project) = self.project_mut(provider_id, project_id) else {
            tracing::debug!("delete_element: project {} not found", project_id);
            return;
        };
        let before = project.elements.len();
        project.elements.retain(|e| e.id != element_id);
        if project.elements.len() == before {
            return;
        }
        self.persist().await;
    }

    // ── Search & connect ────────────────────────────────────────────────────

    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        search::search(&self.data, query)
    }

    /// Resolve an element and hand it to `launcher`. Returns false if the
    /// element does not exist.
    pub fn connect(
        &self,
        provider_id: Uuid,
        project_id: Uuid,
        element_id: Uuid,
        launcher: &dyn TerminalLauncher,
    ) -> bool {
        let Some(element) = self.element(provider_id, project_id, element_id) else {
            tracing::debug!("connect: element {} not found", element_id);
            return false;
        };

        let settings = &self.data.settings;
        let connection = ConnectionDescriptor::resolve(element, settings);
        tracing::info!("Connecting: {}", connection.ssh_command());
        launcher.launch(
            &connection,
            settings.terminal_app,
            settings.custom_terminal_path.as_deref(),
        );
        true
    }

    // ── Export / Import ─────────────────────────────────────────────────────

    /// Write the store to `destination`.
    ///
    /// With a non-empty password sudo passwords are sealed; the live
    /// document is never modified.
    pub async fn export_document(
        &self,
        destination: &Path,
        password: Option<&str>,
    ) -> Result<(), TransferError> {
        let export = build_export(&self.data, password)?;
        write_export(destination, &export).await?;

        tracing::info!(
            "Exported {} providers to {:?} (encrypted: {})",
            export.providers.len(),
            destination,
            export.export_salt.is_some()
        );
        Ok(())
    }

    /// Apply an unlocked import and persist. The file's settings replace the
    /// current ones in both modes.
    pub async fn apply_import(&mut self, import: UnlockedImport, mode: ImportMode) -> ImportSummary {
        let incoming = import.into_document();

        let added = match mode {
            ImportMode::Replace => {
                let added = MergeStats::of(&incoming.providers);
                self.data.providers = incoming.providers;
                added
            }
            ImportMode::Merge => merge_providers(&mut self.data.providers, incoming.providers),
        };
        self.data.settings = incoming.settings;

        self.persist().await;

        tracing::info!(
            "Import applied ({:?}): {} providers, {} projects, {} elements added",
            mode,
            added.providers,
            added.projects,
            added.elements
        );
        ImportSummary { mode, added }
    }

    /// Run the whole import: read, decode, ask for the password if needed,
    /// open every secret, ask for the mode, apply.
    ///
    /// Any failure or cancellation leaves the store untouched.
    pub async fn import_document(
        &mut self,
        source: &Path,
        prompt: &dyn ImportPrompt,
    ) -> Result<ImportSummary, TransferError> {
        let file = ImportFile::read(source).await?;

        let password = match file.salt()? {
            Some(_) => match prompt.password().await.map(Zeroizing::new) {
                Some(password) if !password.is_empty() => Some(password),
                _ => {
                    tracing::info!("Import cancelled at password prompt");
                    return Err(TransferError::Cancelled);
                }
            },
            None => None,
        };

        let unlocked = file.unlock(password.as_deref().map(String::as_str))?;

        let Some(mode) = prompt.choose_mode(&unlocked.preview()).await else {
            tracing::info!("Import cancelled at mode choice");
            return Err(TransferError::Cancelled);
        };

        Ok(self.apply_import(unlocked, mode).await)
    }
}
