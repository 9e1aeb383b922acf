//! Native file dialogs for Horizon Lattice.
//!
//! One API for "open a file", "open multiple files", "save a file" and
//! "choose a folder" that delegates to whichever native facility the running
//! desktop provides:
//!
//! - **KDE**: the `kdialog` helper
//! - **GTK desktops**: the `zenity` helper
//! - **macOS**: AppleScript through `osascript`
//! - **Windows**: the common dialog API
//!
//! The backend is detected once, on first use. File filters are given once as
//! a [`FilterSpec`] and translated into each backend's format. The directory
//! of the last result is remembered and used as the starting directory of the
//! next dialog unless the caller names one or `FILEDIALOG_CWD` is set.
//!
//! # Example
//!
//! ```no_run
//! use horizon_filedialog::{LabeledFilters, open_file, open_multiple, choose_folder};
//!
//! let filter = LabeledFilters::new()
//!     .entry("PDF-Files", "*.pdf")
//!     .entry("Scripts", ["*.py", "*.md"])
//!     .build();
//!
//! if let Some(path) = open_file(None, None, Some(&filter))? {
//!     println!("opened {}", path.display());
//! }
//!
//! // Starts in the directory of the file picked above.
//! for path in open_multiple(Some("Pick attachments"), None, None)? {
//!     println!("attached {}", path.display());
//! }
//!
//! let _folder = choose_folder(None, None)?;
//! # Ok::<(), horizon_filedialog::DialogError>(())
//! ```
//!
//! Cancelling a dialog is not an error: it yields `None` or an empty list.

pub mod backend;
pub mod config;
pub mod dialogs;
pub mod filter;
pub mod logging;
pub mod memory;
pub mod process;
pub mod selector;

mod error;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use backend::{Backend, BackendKind, DialogOperation, DialogRequest, FileDialogBackend};
pub use config::{DialogConfig, DialogTitles};
pub use dialogs::FileDialogs;
pub use error::{BackendUnavailable, DialogError, Result};
pub use filter::{EncodedFilter, FilterGroup, FilterSpec, LabeledFilters};
pub use memory::DirectoryMemory;
pub use selector::{select_backend, DesktopHint, HostEnvironment, OsFamily};

static DIALOGS: OnceLock<std::result::Result<FileDialogs, BackendUnavailable>> = OnceLock::new();

/// The process-wide dialogs, selecting the backend on first use.
///
/// A failed selection is cached too; every later call reports the same
/// [`DialogError::NoBackendAvailable`].
pub fn global() -> Result<&'static FileDialogs> {
    DIALOGS
        .get_or_init(|| {
            let config = DialogConfig::from_env();
            select_backend(&HostEnvironment::detect(&config))
                .map(|backend| FileDialogs::new(backend, config))
        })
        .as_ref()
        .map_err(|e| DialogError::from(e.clone()))
}

/// Kind of the process-wide backend.
pub fn backend_kind() -> Result<BackendKind> {
    Ok(global()?.backend_kind())
}

/// Pick one existing file. See [`FileDialogs::open_file`].
pub fn open_file(
    title: Option<&str>,
    start_dir: Option<&Path>,
    filter: Option<&FilterSpec>,
) -> Result<Option<PathBuf>> {
    global()?.open_file(title, start_dir, filter)
}

/// Pick one or more existing files. See [`FileDialogs::open_multiple`].
pub fn open_multiple(
    title: Option<&str>,
    start_dir: Option<&Path>,
    filter: Option<&FilterSpec>,
) -> Result<Vec<PathBuf>> {
    global()?.open_multiple(title, start_dir, filter)
}

/// Choose a file name to save to. See [`FileDialogs::save_file`].
pub fn save_file(title: Option<&str>, start_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    global()?.save_file(title, start_dir)
}

/// Pick an existing directory. See [`FileDialogs::choose_folder`].
pub fn choose_folder(title: Option<&str>, start_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    global()?.choose_folder(title, start_dir)
}
