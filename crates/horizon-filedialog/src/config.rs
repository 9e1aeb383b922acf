//! Dialog configuration.
//!
//! Configuration can be built in code, loaded from TOML, or taken from the
//! environment:
//!
//! ```
//! use horizon_filedialog::{BackendKind, DialogConfig};
//!
//! let config = DialogConfig::from_toml_str(r#"
//! backend = "zenity"
//!
//! [titles]
//! open_file = "Pick a document"
//! "#).unwrap();
//!
//! assert_eq!(config.backend, Some(BackendKind::Zenity));
//! assert_eq!(config.titles.open_file, "Pick a document");
//! assert_eq!(config.titles.choose_folder, "Choose a folder");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::{BackendKind, DialogOperation};
use crate::error::{DialogError, Result};
use crate::logging::targets;
use crate::memory::DEFAULT_OVERRIDE_VAR;

/// Environment variable that forces a backend.
pub const BACKEND_VAR: &str = "FILEDIALOG_BACKEND";

/// Titles used when the caller does not supply one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogTitles {
    pub open_file: String,
    pub open_multiple: String,
    pub save_file: String,
    pub choose_folder: String,
}

impl Default for DialogTitles {
    fn default() -> Self {
        Self {
            open_file: "Choose a file".into(),
            open_multiple: "Choose one or more files".into(),
            save_file: "Enter the name of the file to save to".into(),
            choose_folder: "Choose a folder".into(),
        }
    }
}

impl DialogTitles {
    /// The default title for `operation`.
    pub fn for_operation(&self, operation: DialogOperation) -> &str {
        match operation {
            DialogOperation::OpenFile => &self.open_file,
            DialogOperation::OpenMultiple => &self.open_multiple,
            DialogOperation::SaveFile => &self.save_file,
            DialogOperation::ChooseFolder => &self.choose_folder,
        }
    }
}

/// Configuration for [`crate::FileDialogs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Environment variable holding the starting-directory override.
    pub cwd_override_var: String,

    /// Use this backend instead of detecting one.
    pub backend: Option<BackendKind>,

    /// Default dialog titles.
    pub titles: DialogTitles,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            titles: DialogTitles::default(),
            cwd_override_var: DEFAULT_OVERRIDE_VAR.into(),
            backend: None,
        }
    }
}

impl DialogConfig {
    /// Default configuration with the forced backend taken from
    /// `FILEDIALOG_BACKEND`.
    ///
    /// An unrecognized value is logged and ignored.
    pub fn from_env() -> Self {
        let backend = std::env::var(BACKEND_VAR)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .and_then(|value| match value.parse::<BackendKind>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::warn!(target: targets::CONFIG, var = BACKEND_VAR, "Ignoring {}", e);
                    None
                }
            });
        Self {
            backend,
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DialogError::config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| DialogError::config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "Loaded dialog configuration");
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| DialogError::config(e.to_string()))
    }

    /// Set the default titles.
    pub fn titles(mut self, titles: DialogTitles) -> Self {
        self.titles = titles;
        self
    }

    /// Set the override variable name.
    pub fn cwd_override_var(mut self, var: impl Into<String>) -> Self {
        self.cwd_override_var = var.into();
        self
    }

    /// Force a backend.
    pub fn backend(mut self, backend: Option<BackendKind>) -> Self {
        self.backend = backend;
        self
    }
}
