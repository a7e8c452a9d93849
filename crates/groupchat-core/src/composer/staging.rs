//! Local attachment staging. Files picked for the next message live here
//! until the send succeeds; nothing in this module touches the network.

use std::fmt;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{ChatError, Result};

/// Local reference used to preview a staged file before upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    fn generate(file_name: &str) -> Self {
        Self(format!("local-preview://{}/{}", Uuid::new_v4(), file_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAttachment {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub preview: PreviewHandle,
}

impl StagedAttachment {
    /// Build from file metadata. The file contents are read only at send time.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|source| ChatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(ChatError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            preview: PreviewHandle::generate(&file_name),
            file_name,
            mime_type,
            size: metadata.len(),
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Label for chips in the composer: long names are shortened.
    pub fn short_name(&self, max_chars: usize) -> String {
        if self.file_name.chars().count() > max_chars {
            let head: String = self.file_name.chars().take(max_chars).collect();
            format!("{}...", head)
        } else {
            self.file_name.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentStaging {
    files: Vec<StagedAttachment>,
}

impl AttachmentStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a file from disk and return the new entry.
    pub fn stage(&mut self, path: impl AsRef<Path>) -> Result<&StagedAttachment> {
        let attachment = StagedAttachment::from_path(path)?;
        self.files.push(attachment);
        Ok(&self.files[self.files.len() - 1])
    }

    pub fn push(&mut self, attachment: StagedAttachment) {
        self.files.push(attachment);
    }

    /// Remove by index. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<StagedAttachment> {
        if index < self.files.len() {
            Some(self.files.remove(index))
        } else {
            None
        }
    }

    pub fn files(&self) -> &[StagedAttachment] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_stage_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "gate-photo.png", b"\x89PNG....");

        let mut staging = AttachmentStaging::new();
        let staged = staging.stage(&path).unwrap();
        assert_eq!(staged.file_name, "gate-photo.png");
        assert_eq!(staged.mime_type, "image/png");
        assert_eq!(staged.size, 8);
        assert!(staged.is_image());
        assert!(staged.preview.as_str().starts_with("local-preview://"));
        assert!(staged.preview.as_str().ends_with("/gate-photo.png"));
        assert_eq!(staging.len(), 1);
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "dump.zzzunknown", b"x");
        let staged = StagedAttachment::from_path(&path).unwrap();
        assert_eq!(staged.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut staging = AttachmentStaging::new();
        let err = staging.stage("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, ChatError::Io { .. }));
        assert!(staging.is_empty());
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StagedAttachment::from_path(dir.path()).is_err());
    }

    #[test]
    fn test_remove_by_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut staging = AttachmentStaging::new();
        for name in ["a.txt", "b.txt", "c.txt"] {
            staging.stage(temp_file(&dir, name, b"1")).unwrap();
        }
        let removed = staging.remove(1).unwrap();
        assert_eq!(removed.file_name, "b.txt");
        let names: Vec<_> = staging.files().iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "c.txt"]);
        assert!(staging.remove(5).is_none());
        assert_eq!(staging.len(), 2);
    }

    #[test]
    fn test_previews_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "same.txt", b"1");
        let a = StagedAttachment::from_path(&path).unwrap();
        let b = StagedAttachment::from_path(&path).unwrap();
        assert_ne!(a.preview, b.preview);
    }

    #[test]
    fn test_short_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "quarterly-report.pdf", b"1");
        let staged = StagedAttachment::from_path(&path).unwrap();
        assert_eq!(staged.short_name(10), "quarterly-...");
        assert_eq!(staged.short_name(40), "quarterly-report.pdf");
    }
}
