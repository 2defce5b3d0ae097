//! # Local Draft Storage
//!
//! Ephemeral JSON snapshots of in-progress form state, keyed by document
//! type (`po:draft`, `do:draft`). A draft is read once when an editing
//! session starts and overwritten only on an explicit "save draft" — there
//! is no auto-save. Invoices are not drafted; they persist to the document
//! store instead.

use std::fs;
use std::path::{Path, PathBuf};

use super::{Document, DocumentKind};
use crate::error::FolioError;

/// Directory-backed draft store. Each key maps to one JSON file.
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `FOLIO_DRAFT_DIR`, or `.folio/drafts` by default.
    pub fn from_env() -> Self {
        let dir = std::env::var("FOLIO_DRAFT_DIR").unwrap_or_else(|_| ".folio/drafts".to_string());
        Self::new(dir)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn key_for(kind: DocumentKind) -> Result<&'static str, FolioError> {
        kind.draft_key().ok_or_else(|| {
            FolioError::Draft(format!("{} documents are not drafted", kind.label()))
        })
    }

    /// Overwrite the draft for the document's kind with a full snapshot.
    pub fn save(&self, document: &Document) -> Result<(), FolioError> {
        let key = Self::key_for(document.kind())?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| FolioError::Draft(format!("failed to serialize draft: {e}")))?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }

    /// Load the draft for a kind, if one exists.
    ///
    /// A corrupt draft file is an error, not a silent reset: the user may
    /// still recover the file by hand.
    pub fn load(&self, kind: DocumentKind) -> Result<Option<Document>, FolioError> {
        let key = Self::key_for(kind)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        let document = serde_json::from_str(&json)
            .map_err(|e| FolioError::Draft(format!("failed to parse draft {key}: {e}")))?;
        Ok(Some(document))
    }

    /// Remove the draft for a kind. Removing a missing draft is a no-op.
    pub fn clear(&self, kind: DocumentKind) -> Result<(), FolioError> {
        let key = Self::key_for(kind)?;
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PurchaseOrder;

    fn store() -> (tempfile::TempDir, DraftStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_draft_round_trip() {
        let (_dir, store) = store();
        let mut po = PurchaseOrder::default();
        po.supplier.name = "Al Noor Trading".to_string();
        po.vat_percent = 5.0;
        store.save(&Document::PurchaseOrder(po)).unwrap();

        let loaded = store.load(DocumentKind::PurchaseOrder).unwrap().unwrap();
        match loaded {
            Document::PurchaseOrder(po) => {
                assert_eq!(po.supplier.name, "Al Noor Trading");
                assert_eq!(po.vat_percent, 5.0);
            }
            other => panic!("wrong kind loaded: {:?}", other.kind()),
        }
    }

    #[test]
    fn test_missing_draft_is_none() {
        let (_dir, store) = store();
        assert!(store.load(DocumentKind::DeliveryOrder).unwrap().is_none());
    }

    #[test]
    fn test_keys_are_separate_per_kind() {
        let (_dir, store) = store();
        store
            .save(&Document::new(DocumentKind::PurchaseOrder))
            .unwrap();
        assert!(store.load(DocumentKind::DeliveryOrder).unwrap().is_none());
        assert!(store.load(DocumentKind::PurchaseOrder).unwrap().is_some());
    }

    #[test]
    fn test_invoices_are_not_drafted() {
        let (_dir, store) = store();
        let err = store.save(&Document::new(DocumentKind::Invoice)).unwrap_err();
        assert!(matches!(err, FolioError::Draft(_)));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (_dir, store) = store();
        store.clear(DocumentKind::PurchaseOrder).unwrap();
        store
            .save(&Document::new(DocumentKind::PurchaseOrder))
            .unwrap();
        store.clear(DocumentKind::PurchaseOrder).unwrap();
        assert!(store.load(DocumentKind::PurchaseOrder).unwrap().is_none());
    }
}
