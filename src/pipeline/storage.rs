//! Durable storage of rendered artifacts.
//!
//! Files are written to a temp file inside the target directory and then
//! persisted under the artifact's unique name, so readers never observe a
//! partially written document.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::pipeline::rendering::RenderedArtifact;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refusing to overwrite existing artifact: {0}")]
    AlreadyExists(PathBuf),

    #[error("Invalid artifact file name: {0}")]
    InvalidName(String),
}

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `artifact` under its file name and return the final path.
    pub fn save(&self, artifact: &RenderedArtifact) -> Result<PathBuf, StorageError> {
        let name = Path::new(&artifact.file_name);
        if name.file_name() != Some(name.as_os_str()) {
            return Err(StorageError::InvalidName(artifact.file_name.clone()));
        }
        std::fs::create_dir_all(&self.root)?;
        let target = self.root.join(name);

        // Dropped (and deleted) on every early return.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&artifact.bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                StorageError::AlreadyExists(target.clone())
            } else {
                StorageError::Io(e.error)
            }
        })?;

        tracing::info!(
            path = %target.display(),
            size_bytes = artifact.size_bytes,
            "Artifact saved"
        );
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::ExportFormat;

    fn artifact(name: &str, bytes: &[u8]) -> RenderedArtifact {
        RenderedArtifact {
            bytes: bytes.to_vec(),
            format: ExportFormat::Pdf,
            file_name: name.to_string(),
            size_bytes: bytes.len(),
            created_at: Utc::now(),
        }
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn saves_under_artifact_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("exports"));
        let path = store.save(&artifact("affidavit_1.pdf", b"%PDF-1.3 test")).unwrap();

        assert_eq!(path, dir.path().join("exports").join("affidavit_1.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.3 test");
        assert_eq!(entries(store.root()), vec!["affidavit_1.pdf"]);
    }

    #[test]
    fn never_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&artifact("draft.docx", b"first")).unwrap();

        let err = store.save(&artifact("draft.docx", b"second")).unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(std::fs::read(dir.path().join("draft.docx")).unwrap(), b"first");
        assert_eq!(entries(dir.path()), vec!["draft.docx"]);
    }

    #[test]
    fn rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store.save(&artifact("../escape.pdf", b"x")).unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
        assert!(entries(dir.path()).is_empty());
    }
}
