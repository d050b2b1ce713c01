//! Atomic file replacement and advisory file locking.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;

/// Temp file used while replacing `path`: the same name plus `.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write bytes atomically (write to temp, fsync, then rename).
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp)?;

    {
        let mut writer = BufWriter::new(&mut file);
        writer.write_all(contents)?;
        writer.flush()?;
    }
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)
}

/// Write pretty-printed JSON atomically.
pub fn atomic_write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    atomic_write(path, &json)
}

/// Read bytes, returning None if the file doesn't exist.
pub fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// RAII advisory lock on a dedicated lock file.
///
/// Cooperating processes must lock the same path. The lock is held per open
/// file handle, so two `FileLock`s in one process exclude each other too.
/// Released on drop.
#[derive(Debug)]
pub struct FileLock {
    file: File,
}

impl FileLock {
    /// Take an exclusive lock, blocking until it is available.
    pub fn exclusive(lock_path: &Path) -> io::Result<Self> {
        let file = Self::open(lock_path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }

    /// Take a shared lock, blocking while an exclusive holder exists.
    pub fn shared(lock_path: &Path) -> io::Result<Self> {
        let file = Self::open(lock_path)?;
        file.lock_shared()?;
        Ok(Self { file })
    }

    /// Try an exclusive lock without blocking; `None` if it is held elsewhere.
    pub fn try_exclusive(lock_path: &Path) -> io::Result<Option<Self>> {
        let file = Self::open(lock_path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file })),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn open(lock_path: &Path) -> io::Result<File> {
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
