//! Session cookie persistence between CLI invocations

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

/// File holding the `Cookie` header value of the current session
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Default location under the user data directory
    pub fn new() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("voicedrop");
        Self {
            path: data_dir.join("session"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Stored cookie header, if any
    pub fn load(&self) -> Option<String> {
        let mut file = File::open(&self.path).ok()?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).ok()?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Replace the stored cookie header. Readable by the owner only.
    pub fn save(&self, cookies: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        write!(file, "{}", cookies)?;
        Ok(())
    }

    /// Delete the stored session. Missing files are fine.
    pub fn remove(&self) -> std::io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Default for SessionFile {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_under_data_dir() {
        let path = SessionFile::new().path().to_string_lossy().to_string();
        assert!(path.contains("voicedrop"));
        assert!(path.ends_with("session"));
    }

    #[test]
    fn save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::with_path(dir.path().join("nested/session"));
        assert!(file.load().is_none());

        file.save("session_id=abc123").unwrap();
        assert_eq!(file.load().as_deref(), Some("session_id=abc123"));

        file.remove().unwrap();
        assert!(file.load().is_none());
        file.remove().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::with_path(dir.path().join("session"));
        file.save("a=b").unwrap();
        let mode = fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
