//! Local filesystem-backed artifact store

use crate::{ArtifactStore, ByteStream};
use futures::StreamExt;
use provmirror_errors::{Error, StorageError};
use provmirror_types::ArtifactLocation;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Size of chunks when streaming a stored file
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Artifact store rooted at a directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    base: PathBuf,
}

impl LocalStore {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base: base.into() }
    }

    /// A store in a fresh temporary directory, removed when the guard drops
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn temporary() -> Result<(Self, tempfile::TempDir), Error> {
        let dir = tempfile::Builder::new()
            .prefix("provmirror-")
            .tempdir()
            .map_err(|e| StorageError::Io {
                message: format!("failed to create temporary store: {e}"),
            })?;
        Ok((Self::new(dir.path()), dir))
    }

    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        let relative = Path::new(key.trim_end_matches('/'));
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !valid {
            return Err(StorageError::InvalidKey {
                key: key.to_string(),
            }
            .into());
        }
        Ok(self.base.join(relative))
    }

    async fn ensure_parent(path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::at_path(&e, parent))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ArtifactStore for LocalStore {
    async fn put_stream(
        &self,
        key: &str,
        mut stream: ByteStream,
    ) -> Result<(ArtifactLocation, u64), Error> {
        let path = self.path_for(key)?;
        Self::ensure_parent(&path).await?;

        let partial = partial_path(&path);
        let mut file = File::create(&partial)
            .await
            .map_err(|e| StorageError::at_path(&e, &partial))?;

        let mut written = 0u64;
        let result: Result<(), Error> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| StorageError::at_path(&e, &partial))?;
                written += chunk.len() as u64;
            }
            file.flush()
                .await
                .map_err(|e| StorageError::at_path(&e, &partial))?;
            Ok(())
        }
        .await;

        drop(file);
        if let Err(err) = result {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                tracing::warn!(
                    path = %partial.display(),
                    error = %cleanup,
                    "could not remove partial artifact"
                );
            }
            return Err(err);
        }

        fs::rename(&partial, &path)
            .await
            .map_err(|e| StorageError::at_path(&e, &path))?;
        tracing::debug!(key, bytes = written, "stored artifact");
        Ok((ArtifactLocation::new(key), written))
    }

    async fn open(&self, location: &ArtifactLocation) -> Result<ByteStream, Error> {
        let path = self.path_for(location.as_str())?;
        let file = File::open(&path)
            .await
            .map_err(|e| StorageError::at_path(&e, &path))?;

        let stream = futures::stream::unfold(Some((file, path)), |state| async move {
            let (mut file, path) = state?;
            let mut buffer = vec![0; CHUNK_SIZE];
            match file.read(&mut buffer).await {
                Ok(0) => None,
                Ok(n) => {
                    buffer.truncate(n);
                    Some((Ok(bytes::Bytes::from(buffer)), Some((file, path))))
                }
                Err(e) => Some((
                    Err(Error::from(StorageError::at_path(&e, &path))),
                    None,
                )),
            }
        });
        Ok(stream.boxed())
    }

    async fn size(&self, location: &ArtifactLocation) -> Result<u64, Error> {
        let path = self.path_for(location.as_str())?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| StorageError::at_path(&e, &path))?;
        Ok(metadata.len())
    }

    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<ArtifactLocation, Error> {
        let path = self.path_for(key)?;
        Self::ensure_parent(&path).await?;
        fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::at_path(&e, &path))?;
        Ok(ArtifactLocation::new(key))
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>, Error> {
        let path = self.path_for(key)?;
        Ok(fs::read(&path)
            .await
            .map_err(|e| StorageError::at_path(&e, &path))?)
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, Error> {
        let dir = self.path_for(prefix)?;
        let mut rd = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::at_path(&e, &dir).into()),
        };

        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        let mut results = Vec::new();
        while let Some(entry) = rd.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "part") || !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                results.push(format!("{prefix}{name}"));
            }
        }
        results.sort();
        Ok(results)
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::at_path(&e, &path).into()),
        }
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<(), Error> {
        let dir = self.path_for(prefix)?;
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::at_path(&e, &dir).into()),
        }
    }
}

/// In-progress writes land next to their final path
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
