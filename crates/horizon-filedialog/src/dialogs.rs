//! The dialog facade.

use std::path::{Path, PathBuf};

use crate::backend::{Backend, BackendKind, DialogOperation, DialogRequest, FileDialogBackend};
use crate::config::DialogConfig;
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::memory::DirectoryMemory;
use crate::selector::{select_backend, HostEnvironment};

/// Native file dialogs bound to one backend.
///
/// Every call resolves the starting directory (explicit argument, else the
/// `FILEDIALOG_CWD` override, else the directory of the last result), fills
/// in the default title, runs the dialog, and remembers the directory of the
/// first returned path.
///
/// # Example
///
/// ```no_run
/// use horizon_filedialog::{FileDialogs, FilterSpec};
///
/// let dialogs = FileDialogs::detect()?;
/// let filter = FilterSpec::patterns(["*.png", "*.jpg"]);
/// if let Some(path) = dialogs.open_file(Some("Open image"), None, Some(&filter))? {
///     println!("{}", path.display());
/// }
/// # Ok::<(), horizon_filedialog::DialogError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileDialogs {
    backend: Backend,
    memory: DirectoryMemory,
    config: DialogConfig,
}

impl FileDialogs {
    /// Detect the backend with configuration from the environment.
    pub fn detect() -> Result<Self> {
        Self::detect_with(DialogConfig::from_env())
    }

    /// Detect the backend using `config`.
    pub fn detect_with(config: DialogConfig) -> Result<Self> {
        let backend = select_backend(&HostEnvironment::detect(&config))?;
        Ok(Self::new(backend, config))
    }

    /// Use `backend`; the override is read from the variable named in `config`.
    pub fn new(backend: Backend, config: DialogConfig) -> Self {
        let memory = DirectoryMemory::from_env(&config.cwd_override_var);
        Self::with_memory(backend, config, memory)
    }

    /// Use `backend` and an existing directory memory.
    pub fn with_memory(backend: Backend, config: DialogConfig, memory: DirectoryMemory) -> Self {
        Self {
            backend,
            memory,
            config,
        }
    }

    /// The selected backend.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Kind of the selected backend.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// The directory memory.
    pub fn memory(&self) -> &DirectoryMemory {
        &self.memory
    }

    /// The configuration.
    pub fn config(&self) -> &DialogConfig {
        &self.config
    }

    /// Pick one existing file.
    pub fn open_file(
        &self,
        title: Option<&str>,
        start_dir: Option<&Path>,
        filter: Option<&FilterSpec>,
    ) -> Result<Option<PathBuf>> {
        let result = self.run(DialogOperation::OpenFile, title, start_dir, filter, |b, r| {
            b.open_file(r)
        })?;
        self.remember(result.as_deref());
        Ok(result)
    }

    /// Pick one or more existing files. Cancelling returns an empty list.
    pub fn open_multiple(
        &self,
        title: Option<&str>,
        start_dir: Option<&Path>,
        filter: Option<&FilterSpec>,
    ) -> Result<Vec<PathBuf>> {
        let result = self.run(DialogOperation::OpenMultiple, title, start_dir, filter, |b, r| {
            b.open_multiple(r)
        })?;
        self.remember(result.first().map(PathBuf::as_path));
        Ok(result)
    }

    /// Choose a file name to save to.
    pub fn save_file(&self, title: Option<&str>, start_dir: Option<&Path>) -> Result<Option<PathBuf>> {
        let result = self.run(DialogOperation::SaveFile, title, start_dir, None, |b, r| {
            b.save_file(r)
        })?;
        self.remember(result.as_deref());
        Ok(result)
    }

    /// Pick an existing directory.
    pub fn choose_folder(
        &self,
        title: Option<&str>,
        start_dir: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let result = self.run(DialogOperation::ChooseFolder, title, start_dir, None, |b, r| {
            b.choose_folder(r)
        })?;
        self.remember(result.as_deref());
        Ok(result)
    }

    fn run<T>(
        &self,
        operation: DialogOperation,
        title: Option<&str>,
        start_dir: Option<&Path>,
        filter: Option<&FilterSpec>,
        call: impl FnOnce(&Backend, &DialogRequest<'_>) -> Result<T>,
    ) -> Result<T> {
        let start_dir = self.memory.resolve(start_dir);
        let title = title.unwrap_or_else(|| self.config.titles.for_operation(operation));
        let request = DialogRequest::new(title)
            .start_dir(start_dir.as_deref())
            .filter(filter);
        call(&self.backend, &request)
    }

    fn remember(&self, path: Option<&Path>) {
        if let Some(path) = path {
            self.memory.remember(path);
        }
    }
}
