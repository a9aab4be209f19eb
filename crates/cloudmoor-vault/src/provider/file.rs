//! File-backed master key.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::KeyProvider;
use crate::error::KeyError;
use crate::key::MasterKey;

/// Stores the master key as a raw 32-byte file.
///
/// The parent directory is created with mode `0700` and the key file is
/// written with mode `0600` on Unix. Rotation keeps the retired key at
/// `<path>.bak`.
#[derive(Debug)]
pub struct FileKeyProvider {
    key_path: PathBuf,
    rotation: Mutex<()>,
}

impl FileKeyProvider {
    /// Open the key at `key_path`, generating one if the file does not exist.
    pub async fn new(key_path: impl Into<PathBuf>) -> Result<Self, KeyError> {
        let key_path = key_path.into();

        if let Some(parent) = key_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent).await?;
        }

        match tokio::fs::metadata(&key_path).await {
            Ok(_) => debug!(path = %key_path.display(), "using existing master key"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let key = MasterKey::generate()?;
                write_key_file(&key_path, &key).await?;
                info!(path = %key_path.display(), "generated new master key");
            }
            Err(e) => return Err(KeyError::io("failed to stat key file", &key_path, e)),
        }

        Ok(Self {
            key_path,
            rotation: Mutex::new(()),
        })
    }

    /// Path of the primary key file.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Path the retired key is written to on rotation.
    pub fn backup_path(&self) -> PathBuf {
        let mut path = self.key_path.clone().into_os_string();
        path.push(".bak");
        PathBuf::from(path)
    }
}

#[async_trait]
impl KeyProvider for FileKeyProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get_key(&self) -> Result<MasterKey, KeyError> {
        let bytes = zeroize::Zeroizing::new(
            tokio::fs::read(&self.key_path)
                .await
                .map_err(|e| KeyError::io("failed to read key file", &self.key_path, e))?,
        );
        MasterKey::from_slice(&bytes)
    }

    async fn rotate_key(&self) -> Result<(MasterKey, MasterKey), KeyError> {
        let _guard = self.rotation.lock().await;

        let old_key = self.get_key().await?;
        let new_key = MasterKey::generate()?;

        // Backup first, then overwrite.
        let backup = self.backup_path();
        write_key_file(&backup, &old_key).await?;
        write_key_file(&self.key_path, &new_key).await?;

        info!(
            path = %self.key_path.display(),
            backup = %backup.display(),
            old = %old_key.fingerprint(),
            new = %new_key.fingerprint(),
            "rotated master key"
        );
        Ok((old_key, new_key))
    }

    /// Succeeds when the key file reads back as exactly 32 bytes;
    /// [`MasterKey::from_slice`] enforces the size.
    async fn health_check(&self) -> Result<(), KeyError> {
        self.get_key().await.map(|_| ())
    }
}

/// Create `dir` (and missing ancestors) with mode 0700 on Unix.
///
/// Existing directories keep their permissions.
async fn ensure_dir(dir: &Path) -> Result<(), KeyError> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);

    builder
        .create(dir)
        .await
        .map_err(|e| KeyError::io("failed to create key directory", dir, e))
}

/// Write `key` to `path` with mode 0600 on Unix.
///
/// The key goes to a sibling `.tmp` file first and is renamed over `path`,
/// so readers see either the previous key or the new one, never a partial file.
async fn write_key_file(path: &Path, key: &MasterKey) -> Result<(), KeyError> {
    let tmp_path = {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    };

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(&tmp_path)
        .await
        .map_err(|e| KeyError::io("failed to open key file", &tmp_path, e))?;
    file.write_all(key.as_bytes())
        .await
        .map_err(|e| KeyError::io("failed to write key file", &tmp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| KeyError::io("failed to sync key file", &tmp_path, e))?;
    drop(file);

    // `mode` only applies on creation; a leftover temp file may be looser.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| KeyError::io("failed to set key file permissions", &tmp_path, e))?;
    }

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(KeyError::io("failed to replace key file", path, e));
    }

    Ok(())
}
