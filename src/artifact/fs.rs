//! Filesystem artifact store.
//!
//! Containers map to directories under a root, keys to (possibly nested)
//! files inside them. Writes land in a `.partial` file first and are renamed
//! into place, so readers never observe a half-written artifact.
//!
//! The root is anchored to the working directory at construction time so
//! that URIs handed out stay valid after the process changes directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use super::ArtifactStore;
use crate::{Error, Result};

/// Artifact store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    ///
    /// A relative root is resolved against the current working directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: absolute_root(root.into()),
        }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_path(&self, container: &str) -> Result<PathBuf> {
        check_relative(container)?;
        Ok(self.root.join(container))
    }

    fn object_path(&self, container: &str, key: &str) -> Result<PathBuf> {
        check_relative(key)?;
        Ok(self.container_path(container)?.join(key))
    }
}

/// Reject names that would escape the store root.
fn check_relative(name: &str) -> Result<()> {
    let path = Path::new(name);
    let escapes = name.is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(Error::ArtifactTransfer(format!(
            "invalid artifact path component: '{name}'"
        )));
    }
    Ok(())
}

fn absolute_root(root: PathBuf) -> PathBuf {
    let anchored = if root.is_absolute() {
        root
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(root),
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "cannot resolve artifact root");
                root
            }
        }
    };
    anchored
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Percent-encode a path segment, keeping RFC 3986 unreserved characters.
fn encode_segment(segment: &str, out: &mut String) {
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
}

fn file_uri(path: &Path) -> String {
    let mut uri = String::from("file://");
    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                uri.push('/');
                encode_segment(&segment.to_string_lossy(), &mut uri);
            }
            Component::ParentDir => uri.push_str("/.."),
            Component::Prefix(prefix) => {
                uri.push('/');
                uri.push_str(&prefix.as_os_str().to_string_lossy());
            }
            Component::RootDir | Component::CurDir => {}
        }
    }
    uri
}

fn transfer_error(action: &str, path: &Path, e: &std::io::Error) -> Error {
    Error::ArtifactTransfer(format!("failed to {action} {}: {e}", path.display()))
}

impl ArtifactStore for FsArtifactStore {
    async fn ensure_container(&self, container: &str) -> Result<()> {
        let path = self.container_path(container)?;
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| transfer_error("create container", &path, &e))?;
        Ok(())
    }

    async fn container_exists(&self, container: &str) -> Result<bool> {
        let path = self.container_path(container)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(transfer_error("inspect container", &path, &e)),
        }
    }

    async fn put(&self, container: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        if !self.container_exists(container).await? {
            return Err(Error::ArtifactTransfer(format!(
                "container '{container}' does not exist"
            )));
        }
        let path = self.object_path(container, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| transfer_error("create directory", parent, &e))?;
        }

        let mut partial = path.clone().into_os_string();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        tokio::fs::write(&partial, &bytes)
            .await
            .map_err(|e| transfer_error("write", &partial, &e))?;
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|e| transfer_error("commit", &path, &e))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "stored artifact");
        Ok(())
    }

    async fn get(&self, container: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.object_path(container, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(transfer_error("read", &path, &e)),
        }
    }

    async fn exists(&self, container: &str, key: &str) -> Result<bool> {
        let path = self.object_path(container, key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(transfer_error("inspect", &path, &e)),
        }
    }

    async fn delete(&self, container: &str, key: &str) -> Result<()> {
        let path = self.object_path(container, key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(transfer_error("delete", &path, &e)),
        }
    }

    fn uri(&self, container: &str, key: &str) -> String {
        file_uri(&self.root.join(container).join(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_relative() {
        assert!(check_relative("models").is_ok());
        assert!(check_relative("exp/staging/exp.zip").is_ok());
        assert!(check_relative("").is_err());
        assert!(check_relative("../etc/passwd").is_err());
        assert!(check_relative("/abs").is_err());
        assert!(check_relative("a/../../b").is_err());
    }

    #[test]
    fn test_uri() {
        let store = FsArtifactStore::new("/var/artifacts");
        assert_eq!(
            store.uri("deployment", "exp/prod/exp.zip"),
            "file:///var/artifacts/deployment/exp/prod/exp.zip"
        );
    }

    #[test]
    fn test_uri_escapes_segments() {
        let store = FsArtifactStore::new("/srv/ml artifacts");
        assert_eq!(
            store.uri("deployment", "Churn Model/staging/Churn Model.zip"),
            "file:///srv/ml%20artifacts/deployment/Churn%20Model/staging/Churn%20Model.zip"
        );
        assert_eq!(
            store.uri("deployment", "a#b/c?d%.zip"),
            "file:///srv/ml%20artifacts/deployment/a%23b/c%3Fd%25.zip"
        );
    }

    #[test]
    fn test_relative_root_is_anchored() {
        let store = FsArtifactStore::new("./artifacts");
        let cwd = std::env::current_dir().unwrap();

        assert!(store.root().is_absolute());
        assert_eq!(store.root(), cwd.join("artifacts"));
    }
}
