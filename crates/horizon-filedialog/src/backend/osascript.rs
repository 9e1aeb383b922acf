//! macOS backend using AppleScript through `osascript`.
//!
//! Each dialog is a short AppleScript program passed with `osascript -e`.
//! AppleScript's `choose file` only filters by type, so the filter is reduced
//! to a flat list of extensions (see [`crate::filter::encode_extensions`]).
//!
//! A cancelled dialog makes `osascript` fail with AppleScript error -128
//! ("User canceled."), which is reported as an empty selection.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::{split_paths, BackendKind, DialogOperation, DialogRequest, FileDialogBackend};
use crate::error::Result;
use crate::process::{HelperOutput, Invocation};

/// AppleScript error number for a dialog dismissed by the user.
const USER_CANCELED: &str = "-128";

/// Drives AppleScript's standard additions through `osascript`.
#[derive(Debug, Clone)]
pub struct OsascriptBackend {
    program: PathBuf,
}

impl OsascriptBackend {
    /// Create a backend for the `osascript` binary at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the `osascript` binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command line for `operation`.
    pub fn invocation(
        &self,
        operation: DialogOperation,
        request: &DialogRequest<'_>,
    ) -> Result<Invocation> {
        let script = script(operation, request)?;
        Ok(Invocation::new(&self.program).arg("-e").arg(script))
    }

    fn select(
        &self,
        operation: DialogOperation,
        request: &DialogRequest<'_>,
    ) -> Result<Option<OsString>> {
        self.invocation(operation, request)?
            .run(BackendKind::Osascript)?
            .into_selection(BackendKind::Osascript, is_user_cancel)
    }
}

fn is_user_cancel(output: &HelperOutput) -> bool {
    output.code() == Some(1) && output.stderr.contains(USER_CANCELED)
}

/// Escape backslashes and double quotes for an AppleScript string literal.
pub fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the AppleScript program for `operation`.
pub fn script(operation: DialogOperation, request: &DialogRequest<'_>) -> Result<String> {
    let extensions = match request.filter {
        Some(filter) if operation.accepts_filter() => filter.to_extensions()?,
        _ => Vec::new(),
    };

    let command = match operation {
        DialogOperation::OpenFile | DialogOperation::OpenMultiple => "choose file",
        DialogOperation::SaveFile => "choose file name",
        DialogOperation::ChooseFolder => "choose folder",
    };

    let mut script = format!("set chosen to {command}");
    if !request.title.is_empty() {
        script.push_str(&format!(" with prompt \"{}\"", escape(request.title)));
    }
    if let Some(dir) = request.start_dir {
        script.push_str(&format!(
            " default location POSIX file \"{}\"",
            escape(&dir.to_string_lossy())
        ));
    }
    if !extensions.is_empty() {
        let types = extensions
            .iter()
            .map(|ext| format!("\"{}\"", escape(ext)))
            .collect::<Vec<_>>()
            .join(", ");
        script.push_str(&format!(" of type {{{types}}}"));
    }

    if operation == DialogOperation::OpenMultiple {
        script.push_str(" with multiple selections allowed");
        script.push_str(concat!(
            "\nset posixList to {}",
            "\nrepeat with f in chosen",
            "\nset end of posixList to POSIX path of f",
            "\nend repeat",
            "\nset AppleScript's text item delimiters to \", \"",
            "\nreturn posixList as string",
        ));
    } else {
        script.push_str("\nPOSIX path of chosen");
    }

    Ok(script)
}

/// Split a multiple selection on `,`, trimming each path.
pub fn parse_multiple(raw: impl AsRef<OsStr>) -> Vec<PathBuf> {
    split_paths(raw.as_ref(), b',', true)
}

impl FileDialogBackend for OsascriptBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Osascript
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
