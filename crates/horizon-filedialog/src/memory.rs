//! Remembered starting directory.
//!
//! After each successful dialog the directory of the first returned path is
//! remembered, and the next dialog opened without an explicit starting
//! directory starts there. An override takes precedence over the remembered
//! value and is never changed by dialogs. The override is either fixed at
//! construction or read from an environment variable (normally
//! `FILEDIALOG_CWD`) on every call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::logging::targets;

/// Environment variable holding the starting-directory override.
pub const DEFAULT_OVERRIDE_VAR: &str = "FILEDIALOG_CWD";

/// Shared handle to the last used directory.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct DirectoryMemory {
    last: Arc<Mutex<Option<PathBuf>>>,
    override_dir: Option<PathBuf>,
    override_var: Option<String>,
}

impl DirectoryMemory {
    /// Create an empty memory without an override.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty memory with a fixed override.
    ///
    /// An empty path counts as no override.
    pub fn with_override(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            override_dir: (!dir.as_os_str().is_empty()).then_some(dir),
            ..Self::default()
        }
    }

    /// Create an empty memory whose override is the environment variable
    /// `var`, read each time a dialog resolves its starting directory.
    /// Unset or empty means no override.
    pub fn from_env(var: impl Into<String>) -> Self {
        let var = var.into();
        tracing::debug!(target: targets::MEMORY, var = %var, "Reading starting directory override from environment");
        Self {
            override_var: Some(var),
            ..Self::default()
        }
    }

    /// The override currently in effect, if any.
    pub fn override_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.override_dir {
            return Some(dir.clone());
        }
        let var = self.override_var.as_deref()?;
        std::env::var_os(var)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// The remembered directory, if any.
    pub fn last(&self) -> Option<PathBuf> {
        self.last.lock().clone()
    }

    /// Where a dialog without an explicit starting directory should open:
    /// the override, else the remembered directory.
    pub fn preferred(&self) -> Option<PathBuf> {
        self.override_dir().or_else(|| self.last())
    }

    /// Resolve a dialog's starting directory. An explicit directory wins.
    pub fn resolve(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(dir) if !dir.as_os_str().is_empty() => Some(dir.to_path_buf()),
            _ => self.preferred(),
        }
    }

    /// Remember the directory containing `path`, replacing the previous one.
    ///
    /// A root is its own directory. A bare file name has no directory, so
    /// the memory is cleared and the next dialog uses the facility's default.
    pub fn remember(&self, path: &Path) {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
            Some(_) => None,
            None if path.has_root() => Some(path.to_path_buf()),
            None => None,
        };
        match &dir {
            Some(dir) => {
                tracing::debug!(target: targets::MEMORY, dir = %dir.display(), "Remembering directory")
            }
            None => tracing::debug!(target: targets::MEMORY, path = %path.display(), "Result has no directory, forgetting"),
        }
        *self.last.lock() = dir;
    }

    /// Forget the remembered directory. The override is kept.
    pub fn clear(&self) {
        self.last.lock().take();
    }
}
