use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

const LOGGED_IN: &str = "authenticated";

/// Where the admin's logged-in flag survives between runs.
pub trait SessionFlagStore: Send + Sync {
    fn load(&self) -> io::Result<bool>;
    fn store(&self, logged_in: bool) -> io::Result<()>;
}

/// Flag kept as a marker file. Deleting the file from outside logs the admin out.
#[derive(Clone, Debug)]
pub struct FileFlag {
    path: PathBuf,
}

impl FileFlag {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionFlagStore for FileFlag {
    fn load(&self) -> io::Result<bool> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(s.trim() == LOGGED_IN),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn store(&self, logged_in: bool) -> io::Result<()> {
        if !logged_in {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            };
        }
        if let Some(d) = self.path.parent() {
            if !d.as_os_str().is_empty() {
                fs::create_dir_all(d)?;
            }
        }
        fs::write(&self.path, format!("{LOGGED_IN}\n"))
    }
}

#[derive(Debug, Default)]
pub struct MemoryFlag {
    logged_in: AtomicBool,
}

impl MemoryFlag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionFlagStore for MemoryFlag {
    fn load(&self) -> io::Result<bool> {
        Ok(self.logged_in.load(Ordering::SeqCst))
    }

    fn store(&self, logged_in: bool) -> io::Result<()> {
        self.logged_in.store(logged_in, Ordering::SeqCst);
        Ok(())
    }
}
