//! Print spooling.
//!
//! The print pathway produces the *same* single-page artifact as the file
//! download — identical raster, identical page-fit placement — and streams
//! it to a spool target instead of returning it to the user. Visual
//! consistency between the two outputs is by construction, not by
//! calibration; see [`super::pagefit::print_layout`] for the equivalent
//! on-screen transform.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FolioError;
use crate::export::ExportArtifact;

/// A print spool: a device path or drop directory the artifact's bytes
/// are written to (e.g. a CUPS hot folder).
#[derive(Debug, Clone)]
pub struct PrintSpool {
    target: PathBuf,
}

impl PrintSpool {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Spool rooted at `FOLIO_SPOOL_DIR`, or `.folio/spool` by default.
    pub fn from_env() -> Self {
        let dir = std::env::var("FOLIO_SPOOL_DIR").unwrap_or_else(|_| ".folio/spool".to_string());
        Self::new(dir)
    }

    /// Submit an artifact to the spool. Writes the full byte stream or
    /// fails without leaving a partial job behind.
    pub fn submit(&self, artifact: &ExportArtifact) -> Result<PathBuf, FolioError> {
        std::fs::create_dir_all(&self.target)?;
        let path = self.target.join(&artifact.file_name);
        let tmp = self.target.join(format!(".{}.part", artifact.file_name));
        {
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(&artifact.bytes)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &path)?;
        Ok(path)
    }

    pub fn target(&self) -> &Path {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentKind;
    use crate::export;

    #[test]
    fn test_submit_writes_complete_job() {
        let dir = tempfile::tempdir().unwrap();
        let spool = PrintSpool::new(dir.path());
        let artifact = ExportArtifact {
            file_name: export::artifact_name(DocumentKind::DeliveryOrder, ""),
            bytes: b"%PDF-1.3 test".to_vec(),
            placement: export::pagefit::fit_to_page(100, 100),
        };
        let path = spool.submit(&artifact).unwrap();
        assert_eq!(path.file_name().unwrap(), "DO-draft.pdf");
        assert_eq!(std::fs::read(path).unwrap(), artifact.bytes);
        // No partial job left behind
        assert!(!dir.path().join(".DO-draft.pdf.part").exists());
    }
}
