//! Lock file utilities.
//!
//! A lock is an exclusive `flock` on a file next to the guarded path. The
//! kernel drops the lock when its owner exits, so a file left behind by a
//! crashed process is simply locked again by the next caller; nothing is
//! ever deleted on another process's behalf. The owner's PID and start time
//! are written into the file as JSON for error messages.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Attempts before giving up when the lock file keeps being replaced under us.
const MAX_ATTEMPTS: usize = 8;

/// Metadata stored in a lock file to identify the owning process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub started: String,
}

/// Errors raised while taking a lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("{} is held by running process {pid}", path.display())]
    Held { path: PathBuf, pid: u32 },

    #[error("Failed to acquire lock {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Get the lock file path guarding `path` for the given `key`.
///
/// The lock path is the store path with `.<key>.lock` appended.
pub fn lock_path_for(path: &Path, key: &str) -> PathBuf {
    let mut lock = path.as_os_str().to_owned();
    lock.push(format!(".{}.lock", key));
    PathBuf::from(lock)
}

/// An acquired lock. The lock file is removed when the guard is dropped.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
    // Holds the flock; closed after the file is unlinked in `drop`.
    _file: File,
}

impl LockFile {
    /// Take the lock at `path` without waiting.
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        let io_err = |source| LockError::Io {
            path: path.to_path_buf(),
            source,
        };
        let held = || LockError::Held {
            path: path.to_path_buf(),
            pid: read_lock(path).map(|info| info.pid).unwrap_or(0),
        };

        for _ in 0..MAX_ATTEMPTS {
            let file = match open_lock_file(path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Err(held()),
                Err(e) => return Err(io_err(e)),
            };
            if !try_flock(&file).map_err(io_err)? {
                return Err(held());
            }
            // The previous owner may have unlinked the file between our open
            // and our flock; a lock on a detached inode excludes nobody.
            if !is_current(&file, path).map_err(io_err)? {
                debug!(path = %path.display(), "lock file replaced while locking, retrying");
                continue;
            }
            return Self::claim(path, file).map_err(io_err);
        }
        Err(held())
    }

    /// Record ourselves as owner of a file we hold the flock on.
    fn claim(path: &Path, mut file: File) -> io::Result<Self> {
        if let Ok(contents) = fs::read_to_string(path) {
            if let Ok(previous) = serde_json::from_str::<LockInfo>(&contents) {
                warn!(path = %path.display(), pid = previous.pid, "reclaiming lock left by exited process");
            }
        }

        let info = LockInfo {
            pid: std::process::id(),
            started: chrono::Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_string(&info).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        file.set_len(0)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        debug!(path = %path.display(), "lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        // Unlink while still holding the flock. A waiter that opened the old
        // inode fails the `is_current` check and retries on a fresh file.
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
}

/// Non-blocking exclusive flock. `Ok(false)` means another handle holds it.
#[cfg(unix)]
fn try_flock(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is owned by `file` and stays open for the call.
    let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if ret == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(false)
    } else {
        Err(err)
    }
}

/// True if `path` still names the inode `file` refers to.
#[cfg(unix)]
fn is_current(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match fs::metadata(path) {
        Ok(on_disk) => Ok(on_disk.dev() == held.dev() && on_disk.ino() == held.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

// Without flock the lock is the file itself: create-new or report it held.
// A lock left by a crashed process must be removed by hand.
#[cfg(not(unix))]
fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> io::Result<bool> {
    Ok(true)
}

#[cfg(not(unix))]
fn is_current(_file: &File, _path: &Path) -> io::Result<bool> {
    Ok(true)
}

/// Read lock info if the lock file exists and the owning PID is still alive.
///
/// Returns `None` if the lock file is missing, malformed, or the PID is dead.
pub fn read_lock(path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(path).ok()?;
    let info: LockInfo = serde_json::from_str(&contents).ok()?;
    if !is_pid_alive(info.pid) {
        return None;
    }
    Some(info)
}

/// Check whether a process with the given PID is still running.
///
/// Uses `kill(pid, 0)` which checks for process existence without sending a signal.
/// Returns `true` if the process exists (even if owned by another user: EPERM).
#[cfg(unix)]
pub(crate) fn is_pid_alive(pid: u32) -> bool {
    if pid == 0 || pid > i32::MAX as u32 {
        return false;
    }
    // SAFETY: kill with signal 0 only checks process existence, no signal is sent.
    let ret = unsafe { libc::kill(pid as libc::pid_t, 0) };
    if ret == 0 {
        return true;
    }
    // EPERM means the process exists but belongs to another user
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub(crate) fn is_pid_alive(_pid: u32) -> bool {
    false
}
