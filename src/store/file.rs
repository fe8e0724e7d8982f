use super::{RefreshHandle, RefreshHandleStore};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

const STORE_DIR: &str = ".authsession";
const STORE_FILE: &str = "refresh.json";

#[derive(Serialize, Deserialize)]
struct StoredHandle {
    cookie_name: String,
    value: String,
}

/// JSON file holding the refresh handle, readable only by the owner on unix.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.authsession/refresh.json`
    /// # Errors
    /// Returns an error if `HOME` is not set.
    pub fn default_path() -> Result<PathBuf> {
        let home = env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .ok_or_else(|| anyhow!("HOME is not set; pass --store to choose a location"))?;
        Ok(PathBuf::from(home).join(STORE_DIR).join(STORE_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RefreshHandleStore for FileStore {
    fn load(&self) -> Result<Option<RefreshHandle>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read refresh handle: {}", self.path.display()))?;

        let stored: StoredHandle =
            serde_json::from_str(&content).context("Failed to parse refresh handle")?;

        debug!(path = %self.path.display(), "loaded refresh handle");

        Ok(Some(RefreshHandle::new(
            stored.cookie_name,
            SecretString::from(stored.value),
        )))
    }

    fn save(&self, handle: &RefreshHandle) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let stored = StoredHandle {
            cookie_name: handle.cookie_name.clone(),
            value: handle.value.expose_secret().to_string(),
        };

        let json =
            serde_json::to_string_pretty(&stored).context("Failed to serialize refresh handle")?;

        let mut file = create_private_file(&self.path)?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write refresh handle: {}", self.path.display()))?;

        debug!(path = %self.path.display(), "saved refresh handle");

        Ok(())
    }

    fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to delete refresh handle: {}", self.path.display()))?;

        Ok(true)
    }
}

/// Opens `path` truncated for writing, readable only by the owner (0600 on
/// Unix). An existing file is tightened before any bytes are written.
#[cfg(unix)]
fn create_private_file(path: &Path) -> Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    file.set_permissions(fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))?;

    Ok(file)
}

#[cfg(not(unix))]
fn create_private_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}
