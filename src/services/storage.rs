use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::core::config::Settings;

/// Disk-backed blob store. Uploads live under the configured root, one
/// subpath per answer key or submission, and are served back via
/// `GET /uploads/{key}`.
#[derive(Debug, Clone)]
pub(crate) struct StorageService {
    root: PathBuf,
    base_url: String,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredFile {
    pub(crate) key: String,
    pub(crate) url: String,
    pub(crate) size: i64,
    #[allow(dead_code)]
    pub(crate) sha256: String,
}

impl StorageService {
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let root = PathBuf::from(&settings.storage().upload_folder);
        let base_url = settings.storage().base_url.trim_end_matches('/').to_string();

        for subdir in ["keys", "answers/descriptive", "answers/omr"] {
            tokio::fs::create_dir_all(root.join(subdir)).await?;
        }

        Ok(Self { root, base_url })
    }

    pub(crate) async fn upload_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<StoredFile> {
        let Some(path) = self.resolve(key) else {
            anyhow::bail!("invalid storage key: {key}");
        };

        let size = bytes.len() as i64;
        let hash = Sha256::digest(&bytes);
        let sha256 = hex::encode(hash);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        Ok(StoredFile { key: key.to_string(), url: self.file_url(key), size, sha256 })
    }

    pub(crate) fn file_url(&self, key: &str) -> String {
        format!("{}/uploads/{}", self.base_url, key)
    }

    /// Resolves a relative key against the upload root; rejects anything that
    /// would escape it.
    pub(crate) fn resolve(&self, key: &str) -> Option<PathBuf> {
        let relative = Path::new(key);
        if relative.components().any(|component| !matches!(component, Component::Normal(_))) {
            return None;
        }
        if key.trim().is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }
}

pub(crate) fn sanitized_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> StorageService {
        StorageService { root: PathBuf::from("uploads"), base_url: "http://127.0.0.1:5000".into() }
    }

    #[test]
    fn resolve_rejects_traversal() {
        let storage = service();
        assert!(storage.resolve("keys/../../etc/passwd").is_none());
        assert!(storage.resolve("/etc/passwd").is_none());
        assert!(storage.resolve("").is_none());
        assert!(storage.resolve("keys/file.pdf").is_some());
    }

    #[test]
    fn file_url_joins_under_uploads() {
        let storage = service();
        assert_eq!(
            storage.file_url("answers/descriptive/abc/sheet.pdf"),
            "http://127.0.0.1:5000/uploads/answers/descriptive/abc/sheet.pdf"
        );
    }

    #[test]
    fn sanitized_filename_strips_oddities() {
        assert_eq!(sanitized_filename("my exam (final).pdf"), "my_exam__final_.pdf");
        assert_eq!(sanitized_filename("../../evil.sh"), "evil.sh");
        assert_eq!(sanitized_filename("..."), "file");
    }
}
