//! Upload directory management
//!
//! Files live flat in one directory. Listing and quota checks always scan the
//! directory; nothing about the files is cached.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::error::ServerError;

/// Name prefix of uploads still being written. Such files are not listed and
/// clients cannot name them.
pub const STAGING_PREFIX: &str = ".filedrop-upload-";

/// A regular file in the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

/// The upload directory and its quota ceiling.
#[derive(Debug)]
pub struct Storage {
    dir: PathBuf,
    max_files: usize,
    /// Serializes quota check and reservation
    gate: Mutex<()>,
    /// Uploads that passed the quota check and are still being written
    pending: Arc<AtomicUsize>,
    staged: AtomicU64,
}

/// A quota slot held by an upload in progress. Released on drop.
#[derive(Debug)]
pub struct UploadSlot {
    pending: Arc<AtomicUsize>,
}

impl Drop for UploadSlot {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> Self {
        Self {
            dir: dir.into(),
            max_files,
            gate: Mutex::new(()),
            pending: Arc::new(AtomicUsize::new(0)),
            staged: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Creates the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Regular files in the directory, sorted by name.
    pub async fn list(&self) -> io::Result<Vec<StoredFile>> {
        self.ensure_dir().await?;

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !meta.is_file() || name.starts_with(STAGING_PREFIX) {
                continue;
            }
            files.push(StoredFile {
                name,
                size: meta.len(),
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    pub async fn count_files(&self) -> io::Result<usize> {
        Ok(self.list().await?.len())
    }

    /// Checks the quota and reserves room for one more file.
    ///
    /// The check counts stored files plus slots already handed out, under a
    /// lock, so concurrent uploads cannot both take the last slot.
    pub async fn reserve_slot(&self) -> Result<UploadSlot, ServerError> {
        let _gate = self.gate.lock().await;

        let current = self.count_files().await? + self.pending.load(Ordering::SeqCst);
        if current >= self.max_files {
            return Err(ServerError::QuotaExceeded {
                current,
                max: self.max_files,
            });
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        Ok(UploadSlot {
            pending: Arc::clone(&self.pending),
        })
    }

    /// Maps a client-supplied file name to a path inside the directory.
    ///
    /// Only a single plain path component is accepted: no separators, no
    /// `.` or `..`, no NUL bytes and no staging names.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, ServerError> {
        let invalid = || ServerError::InvalidFileName(name.to_string());

        if name.is_empty()
            || name.contains(['/', '\\', '\0'])
            || name.starts_with(STAGING_PREFIX)
        {
            return Err(invalid());
        }

        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(name)),
            _ => Err(invalid()),
        }
    }

    /// A fresh path in the directory to write an upload to before it is
    /// renamed into place.
    pub fn staging_path(&self) -> PathBuf {
        let n = self.staged.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!("{STAGING_PREFIX}{}-{n}", std::process::id()))
    }

    /// Opens a stored file for download.
    pub async fn open(&self, name: &str) -> Result<(tokio::fs::File, u64), ServerError> {
        let path = self.resolve(name)?;
        let not_found = || ServerError::NotFound(name.to_string());

        let file = tokio::fs::File::open(&path).await.map_err(|_| not_found())?;
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(not_found());
        }
        Ok((file, meta.len()))
    }

    /// Removes one stored file by name.
    pub async fn delete(&self, name: &str) -> Result<(), ServerError> {
        let path = self.resolve(name)?;

        match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(ServerError::NotFound(name.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ServerError::NotFound(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        tokio::fs::remove_file(&path).await?;
        Ok(())
    }
}

const SIZE_PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Human-readable size: plain bytes under 1 KiB, otherwise one decimal in
/// base-1024 units.
///
/// ```
/// # use filedrop::storage::format_file_size;
/// assert_eq!(format_file_size(512), "512 B");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// ```
pub fn format_file_size(size: u64) -> String {
    if size < 1024 {
        return format!("{size} B");
    }

    let mut exp = 0;
    let mut unit: u64 = 1;
    while exp < SIZE_PREFIXES.len() && size / unit >= 1024 {
        unit *= 1024;
        exp += 1;
    }

    format!("{:.1} {}B", size as f64 / unit as f64, SIZE_PREFIXES[exp - 1])
}
