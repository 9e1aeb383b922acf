//! GTK backend using the `zenity` helper.
//!
//! Command line shape:
//!
//! ```text
//! zenity --file-selection [--multiple] --title=TITLE [--filename=DIR/] [--file-filter=...]...
//! zenity --file-selection --save --confirm-overwrite --title=TITLE [--filename=DIR/]
//! zenity --file-selection --directory --title=TITLE [--filename=DIR/]
//! ```
//!
//! zenity exits with status 1 when the user cancels and separates multiple
//! selections with `|`.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use super::{split_paths, BackendKind, DialogOperation, DialogRequest, FileDialogBackend};
use crate::error::Result;
use crate::process::Invocation;

/// Drives GNOME's `zenity`.
#[derive(Debug, Clone)]
pub struct ZenityBackend {
    program: PathBuf,
}

impl ZenityBackend {
    /// Create a backend for the `zenity` binary at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the `zenity` binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command line for `operation`.
    pub fn invocation(
        &self,
        operation: DialogOperation,
        request: &DialogRequest<'_>,
    ) -> Result<Invocation> {
        let filters = match request.filter {
            Some(filter) if operation.accepts_filter() => filter.to_zenity()?,
            _ => Vec::new(),
        };

        let mut invocation = Invocation::new(&self.program)
            .current_dir(request.start_dir)
            .arg("--file-selection");
        match operation {
            DialogOperation::OpenFile => {}
            DialogOperation::OpenMultiple => invocation.push_arg("--multiple"),
            DialogOperation::SaveFile => {
                invocation.push_arg("--save");
                invocation.push_arg("--confirm-overwrite");
            }
            DialogOperation::ChooseFolder => invocation.push_arg("--directory"),
        }

        invocation.push_arg(format!("--title={}", request.title));
        if let Some(dir) = request.start_dir {
            invocation.push_arg(filename_arg(dir));
        }
        for filter in filters {
            invocation.push_arg(filter);
        }
        Ok(invocation)
    }

    fn select(
        &self,
        operation: DialogOperation,
        request: &DialogRequest<'_>,
    ) -> Result<Option<OsString>> {
        self.invocation(operation, request)?
            .run(BackendKind::Zenity)?
            .into_selection(BackendKind::Zenity, |out| out.code() == Some(1))
    }
}

/// `--filename=DIR/`; the trailing separator makes zenity open inside `DIR`.
fn filename_arg(dir: &Path) -> OsString {
    let mut arg = OsString::from("--filename=");
    arg.push(dir.as_os_str());
    if !dir.as_os_str().to_string_lossy().ends_with(MAIN_SEPARATOR) {
        arg.push(MAIN_SEPARATOR.to_string());
    }
    arg
}

/// Split a `--multiple` selection on `|`.
pub fn parse_multiple(raw: impl AsRef<OsStr>) -> Vec<PathBuf> {
    split_paths(raw.as_ref(), b'|', false)
}

impl FileDialogBackend for ZenityBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Zenity
    }

    fn open_file(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        Ok(self
            .select(DialogOperation::OpenFile, request)?
            .map(PathBuf::from))
    }

    fn open_multiple(&self, request: &DialogRequest<'_>) -> Result<Vec<PathBuf>> {
        Ok(self
            .select(DialogOperation::OpenMultiple, request)?
            .map(|raw| parse_multiple(&raw))
            .unwrap_or_default())
    }

    fn save_file(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        Ok(self
            .select(DialogOperation::SaveFile, request)?
            .map(PathBuf::from))
    }

    fn choose_folder(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        Ok(self
            .select(DialogOperation::ChooseFolder, request)?
            .map(PathBuf::from))
    }
}
