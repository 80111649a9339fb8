//! Debounced saving of the current project.
//!
//! The editor reports edits through [`Editor::take_changed`](crate::editor::Editor::take_changed);
//! hosts forward that to [`AutoSaveManager::mark_dirty`] and poll
//! [`AutoSaveManager::maybe_save`] from their event loop.

use crate::project::ProjectDocument;
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Key for the "last opened" project.
pub const LAST_DOCUMENT_KEY: &str = "__last_document__";

/// Manages automatic project persistence.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    current_doc_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
            current_doc_id: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the project as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_document_id(&mut self, id: Option<String>) {
        self.current_doc_id = id;
    }

    pub fn document_id(&self) -> Option<&str> {
        self.current_doc_id.as_deref()
    }

    /// Dirty, and either never saved or the interval has elapsed.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if [`should_save`](Self::should_save). Returns whether it saved.
    pub async fn maybe_save(&mut self, document: &ProjectDocument) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(document).await?;
        Ok(true)
    }

    /// Save now, under the current id (or the document's own id) and as the
    /// last document.
    pub async fn save(&mut self, document: &ProjectDocument) -> StorageResult<()> {
        let doc_id = self
            .current_doc_id
            .clone()
            .unwrap_or_else(|| document.id.clone());

        self.storage.save(&doc_id, document).await?;
        self.storage.save(LAST_DOCUMENT_KEY, document).await?;

        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::info!("Auto-saved project '{}' ({})", document.name, doc_id);
        Ok(())
    }

    /// Load a project and make it current.
    pub async fn load(&mut self, id: &str) -> StorageResult<ProjectDocument> {
        let doc = self.storage.load(id).await?;
        self.current_doc_id = Some(id.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(doc)
    }

    /// Load the last saved project, if any.
    pub async fn load_last(&mut self) -> Option<ProjectDocument> {
        match self.storage.load(LAST_DOCUMENT_KEY).await {
            Ok(doc) => {
                self.current_doc_id = Some(doc.id.clone());
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(doc)
            }
            Err(err) => {
                log::debug!("No last project to restore: {}", err);
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// Saved project ids, without the last-document entry.
    pub async fn list_documents(&self) -> StorageResult<Vec<String>> {
        let mut docs = self.storage.list().await?;
        docs.retain(|id| id != LAST_DOCUMENT_KEY);
        Ok(docs)
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Platform file storage in the default location.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

/// Auto-save manager over the platform file storage.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformAutoSaveManager = AutoSaveManager<crate::storage::FileStorage>;

#[cfg(not(target_arch = "wasm32"))]
pub fn create_autosave_manager() -> StorageResult<PlatformAutoSaveManager> {
    Ok(AutoSaveManager::new(create_default_storage()?))
}
