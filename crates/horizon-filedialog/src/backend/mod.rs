//! Native dialog backends.
//!
//! Each backend exposes the same four operations through [`FileDialogBackend`]
//! and translates them into the invocation its native facility expects:
//!
//! - `kdialog`: KDE dialog helper, one process per dialog
//! - `zenity`: GTK dialog helper, one process per dialog
//! - `osascript`: AppleScript bridge on macOS, one process per dialog
//! - `win32`: Windows common dialogs (`GetOpenFileNameW`, `SHBrowseForFolderW`)
//!
//! The backend in use is chosen once by [`crate::selector`] and held as a
//! [`Backend`] value.

use std::ffi::OsStr;
use std::fmt;
#[cfg(unix)]
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DialogError, Result};
use crate::filter::FilterSpec;

pub mod kdialog;
pub mod osascript;
pub mod win32;
pub mod zenity;

pub use kdialog::KDialogBackend;
pub use osascript::OsascriptBackend;
pub use win32::Win32Backend;
pub use zenity::ZenityBackend;

/// The kinds of native dialog facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// KDE's `kdialog` helper.
    KDialog,
    /// GTK's `zenity` helper.
    Zenity,
    /// AppleScript through `osascript`.
    Osascript,
    /// Windows common dialogs.
    Win32,
}

impl BackendKind {
    /// All backend kinds.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::KDialog,
        BackendKind::Zenity,
        BackendKind::Osascript,
        BackendKind::Win32,
    ];

    /// Short lowercase name, also used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            Self::KDialog => "kdialog",
            Self::Zenity => "zenity",
            Self::Osascript => "osascript",
            Self::Win32 => "win32",
        }
    }

    /// Whether the backend can present labeled filter groups.
    ///
    /// The AppleScript bridge only accepts a flat extension list.
    pub fn supports_filter_groups(self) -> bool {
        !matches!(self, Self::Osascript)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| DialogError::config(format!("unknown dialog backend '{s}'")))
    }
}

/// The four dialog operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOperation {
    /// Pick one existing file.
    OpenFile,
    /// Pick one or more existing files.
    OpenMultiple,
    /// Pick a file name to save to.
    SaveFile,
    /// Pick an existing directory.
    ChooseFolder,
}

impl DialogOperation {
    /// Whether the operation accepts a file filter.
    pub fn accepts_filter(self) -> bool {
        matches!(self, Self::OpenFile | Self::OpenMultiple)
    }
}

/// Parameters of one dialog invocation.
///
/// `start_dir` is already resolved: it is the caller's explicit directory, or
/// the remembered one when the caller gave none.
#[derive(Debug, Clone, Copy)]
pub struct DialogRequest<'a> {
    /// Dialog title or prompt.
    pub title: &'a str,
    /// Directory the dialog should open in.
    pub start_dir: Option<&'a Path>,
    /// File filter, for operations that accept one.
    pub filter: Option<&'a FilterSpec>,
}

impl<'a> DialogRequest<'a> {
    /// Create a request with only a title.
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            start_dir: None,
            filter: None,
        }
    }

    /// Set the starting directory.
    pub fn start_dir(mut self, dir: Option<&'a Path>) -> Self {
        self.start_dir = dir;
        self
    }

    /// Set the file filter.
    pub fn filter(mut self, filter: Option<&'a FilterSpec>) -> Self {
        self.filter = filter;
        self
    }
}

/// The operations every native dialog backend provides.
///
/// Implementations block until the dialog is closed. A cancelled dialog
/// yields `None` or an empty list; errors are reserved for malformed filters
/// and for facilities that fail to run.
pub trait FileDialogBackend: Send + Sync {
    /// Which facility this backend drives.
    fn kind(&self) -> BackendKind;

    /// Show a dialog for picking one existing file.
    fn open_file(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>>;

    /// Show a dialog for picking several existing files.
    fn open_multiple(&self, request: &DialogRequest<'_>) -> Result<Vec<PathBuf>>;

    /// Show a dialog for choosing a file name to save to.
    fn save_file(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>>;

    /// Show a dialog for picking an existing directory.
    fn choose_folder(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>>;
}

/// The backend chosen for this process.
#[derive(Debug, Clone)]
pub enum Backend {
    /// KDE's `kdialog` helper.
    KDialog(KDialogBackend),
    /// GTK's `zenity` helper.
    Zenity(ZenityBackend),
    /// AppleScript through `osascript`.
    Osascript(OsascriptBackend),
    /// Windows common dialogs.
    Win32(Win32Backend),
}

impl Backend {
    fn inner(&self) -> &dyn FileDialogBackend {
        match self {
            Self::KDialog(b) => b,
            Self::Zenity(b) => b,
            Self::Osascript(b) => b,
            Self::Win32(b) => b,
        }
    }

    /// Path of the helper program, for process-based backends.
    pub fn program(&self) -> Option<&Path> {
        match self {
            Self::KDialog(b) => Some(b.program()),
            Self::Zenity(b) => Some(b.program()),
            Self::Osascript(b) => Some(b.program()),
            Self::Win32(_) => None,
        }
    }
}

impl FileDialogBackend for Backend {
    fn kind(&self) -> BackendKind {
        self.inner().kind()
    }

    fn open_file(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        self.inner().open_file(request)
    }

    fn open_multiple(&self, request: &DialogRequest<'_>) -> Result<Vec<PathBuf>> {
        self.inner().open_multiple(request)
    }

    fn save_file(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        self.inner().save_file(request)
    }

    fn choose_folder(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        self.inner().choose_folder(request)
    }
}

/// Split helper output on the ASCII `delimiter`, dropping empty segments.
///
/// Works on the raw bytes, so paths that are not valid UTF-8 survive.
#[cfg(unix)]
pub(crate) fn split_paths(raw: &OsStr, delimiter: u8, trim: bool) -> Vec<PathBuf> {
    raw.as_bytes()
        .split(|&b| b == delimiter)
        .map(|segment| if trim { segment.trim_ascii() } else { segment })
        .filter(|segment| !segment.is_empty())
        .map(|segment| PathBuf::from(OsStr::from_bytes(segment)))
        .collect()
}

/// Split helper output on the ASCII `delimiter`, dropping empty segments.
#[cfg(not(unix))]
pub(crate) fn split_paths(raw: &OsStr, delimiter: u8, trim: bool) -> Vec<PathBuf> {
    raw.to_string_lossy()
        .split(char::from(delimiter))
        .map(|segment| if trim { segment.trim() } else { segment })
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .collect()
}
