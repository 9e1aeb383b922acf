//! KDE backend using the `kdialog` helper.
//!
//! Command line shape:
//!
//! ```text
//! kdialog --getopenfilename [--multiple] [START_DIR] [FILTER] --title TITLE
//! kdialog --getsavefilename [START_DIR] --title TITLE
//! kdialog --getexistingdirectory [START_DIR] --title TITLE
//! ```
//!
//! kdialog exits with status 1 when the user cancels.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use super::{split_paths, BackendKind, DialogOperation, DialogRequest, FileDialogBackend};
use crate::error::Result;
use crate::process::Invocation;

/// Drives KDE's `kdialog`.
#[derive(Debug, Clone)]
pub struct KDialogBackend {
    program: PathBuf,
}

impl KDialogBackend {
    /// Create a backend for the `kdialog` binary at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the `kdialog` binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command line for `operation`.
    pub fn invocation(
        &self,
        operation: DialogOperation,
        request: &DialogRequest<'_>,
    ) -> Result<Invocation> {
        let filter = match request.filter {
            Some(filter) if operation.accepts_filter() => Some(filter.to_kdialog()?),
            _ => None,
        };

        let mut invocation = Invocation::new(&self.program).current_dir(request.start_dir);
        invocation.push_arg(match operation {
            DialogOperation::OpenFile | DialogOperation::OpenMultiple => "--getopenfilename",
            DialogOperation::SaveFile => "--getsavefilename",
            DialogOperation::ChooseFolder => "--getexistingdirectory",
        });
        if operation == DialogOperation::OpenMultiple {
            invocation.push_arg("--multiple");
        }

        // The filter is positional and must follow a start location.
        match (request.start_dir, &filter) {
            (Some(dir), _) => invocation.push_arg(dir),
            (None, Some(_)) => invocation.push_arg("."),
            (None, None) => {}
        }
        if let Some(filter) = filter {
            invocation.push_arg(filter);
        }

        invocation.push_arg("--title");
        invocation.push_arg(request.title);
        Ok(invocation)
    }

    fn select(
        &self,
        operation: DialogOperation,
        request: &DialogRequest<'_>,
    ) -> Result<Option<OsString>> {
        self.invocation(operation, request)?
            .run(BackendKind::KDialog)?
            .into_selection(BackendKind::KDialog, |out| out.code() == Some(1))
    }
}

/// Split a `--multiple` selection.
///
/// kdialog separates the paths with single spaces, so a path that itself
/// contains a space is split apart. Empty segments are dropped: runs of
/// spaces count as one separator, and leading or trailing spaces are
/// ignored. A file name consisting only of spaces, or a name with doubled
/// spaces, cannot be recovered from this format.
pub fn parse_multiple(raw: impl AsRef<OsStr>) -> Vec<PathBuf> {
    split_paths(raw.as_ref(), b' ', true)
}

impl FileDialogBackend for KDialogBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::KDialog
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterSpec, LabeledFilters};

    fn backend() -> KDialogBackend {
        KDialogBackend::new("/usr/bin/kdialog")
    }

    #[test]
    fn test_open_file_arguments() {
        let filter: FilterSpec = LabeledFilters::new()
            .entry("PDF-Files", "*.pdf")
            .entry("Scripts", ["*.py", "*.md"])
            .into();
        let request = DialogRequest::new("Choose a file")
            .start_dir(Some(Path::new("/home/user")))
            .filter(Some(&filter));

        let invocation = backend()
            .invocation(DialogOperation::OpenFile, &request)
            .unwrap();
        assert_eq!(
            invocation.args_lossy(),
            vec![
                "--getopenfilename",
                "/home/user",
                "PDF-Files (*.pdf) | Scripts (*.py *.md)",
                "--title",
                "Choose a file",
            ]
        );
    }

    #[test]
    fn test_filter_without_start_dir_uses_placeholder() {
        let filter = FilterSpec::pattern("*.txt");
        let request = DialogRequest::new("Pick").filter(Some(&filter));
        let invocation = backend()
            .invocation(DialogOperation::OpenMultiple, &request)
            .unwrap();
        assert_eq!(
            invocation.args_lossy(),
            vec!["--getopenfilename", "--multiple", ".", "*.txt", "--title", "Pick"]
        );
    }

    #[test]
    fn test_save_and_folder_ignore_filter() {
        let filter = FilterSpec::pattern("*.txt");
        let request = DialogRequest::new("Save").filter(Some(&filter));

        let save = backend()
            .invocation(DialogOperation::SaveFile, &request)
            .unwrap();
        assert_eq!(save.args_lossy(), vec!["--getsavefilename", "--title", "Save"]);

        let folder = backend()
            .invocation(DialogOperation::ChooseFolder, &request)
            .unwrap();
        assert_eq!(
            folder.args_lossy(),
            vec!["--getexistingdirectory", "--title", "Save"]
        );
    }

    #[test]
    fn test_invalid_filter_fails_before_invocation() {
        let filter = FilterSpec::Patterns(vec![]);
        let request = DialogRequest::new("Pick").filter(Some(&filter));
        let err = backend()
            .invocation(DialogOperation::OpenFile, &request)
            .unwrap_err();
        assert!(err.is_invalid_filter());
    }

    #[test]
    fn test_parse_multiple_splits_on_spaces() {
        assert_eq!(
            parse_multiple("/a/b.txt /a/c.txt"),
            vec![PathBuf::from("/a/b.txt"), PathBuf::from("/a/c.txt")]
        );
    }

    #[test]
    fn test_parse_multiple_collapses_repeated_spaces() {
        assert_eq!(
            parse_multiple(" /a/b.txt  /a/c.txt "),
            vec![PathBuf::from("/a/b.txt"), PathBuf::from("/a/c.txt")]
        );
        assert!(parse_multiple("   ").is_empty());
    }

    #[test]
    fn test_parse_multiple_breaks_paths_with_spaces() {
        // Known limitation of kdialog's output format.
        assert_eq!(
            parse_multiple("/a/my file.txt"),
            vec![PathBuf::from("/a/my"), PathBuf::from("file.txt")]
        );
    }
}
