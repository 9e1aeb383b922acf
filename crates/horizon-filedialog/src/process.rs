//! Helper process invocation shared by the process-based backends.
//!
//! `kdialog`, `zenity` and `osascript` all follow the same protocol: the
//! dialog is described on the command line, the selection is printed on
//! stdout, diagnostics go to stderr, and the exit status tells success,
//! cancellation and failure apart.

use std::ffi::{OsStr, OsString};
#[cfg(unix)]
use std::os::unix::ffi::OsStringExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::backend::BackendKind;
use crate::error::{DialogError, Result};
use crate::logging::targets;

/// A fully built helper command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Invocation {
    /// Start a command line for `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.push_arg(arg);
        self
    }

    /// Append one argument in place.
    pub fn push_arg(&mut self, arg: impl AsRef<OsStr>) {
        self.args.push(arg.as_ref().to_os_string());
    }

    /// Run the helper inside `dir`, if it names an existing directory.
    pub fn current_dir(mut self, dir: Option<&Path>) -> Self {
        self.cwd = dir.filter(|d| d.is_dir()).map(Path::to_path_buf);
        self
    }

    /// The helper program.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments, in order.
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// The arguments as (lossily converted) strings.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// The working directory the helper runs in.
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Run the helper and wait for it to exit.
    ///
    /// Only a helper that cannot be started is an error here; the exit status
    /// is interpreted by [`HelperOutput::into_selection`].
    pub fn run(&self, backend: BackendKind) -> Result<HelperOutput> {
        tracing::debug!(
            target: targets::BACKEND,
            backend = %backend,
            program = %self.program.display(),
            args = self.args.len(),
            "Invoking dialog helper"
        );

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let output = command
            .output()
            .map_err(|e| DialogError::spawn(backend, e))?;

        Ok(HelperOutput {
            status: output.status,
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// What a helper process printed and how it exited.
#[derive(Debug, Clone)]
pub struct HelperOutput {
    /// Exit status of the helper.
    pub status: ExitStatus,
    /// Captured standard output, as raw bytes. Paths are not required to be
    /// UTF-8.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: String,
}

impl HelperOutput {
    /// Exit code, or `None` if the helper was killed by a signal.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Interpret the output as a dialog selection.
    ///
    /// - success with output: `Some(trimmed stdout)`, stderr logged as a warning
    /// - success without output, or `is_cancel` holds: `None`
    /// - any other exit: [`DialogError::BackendInvocationFailed`]
    pub fn into_selection(
        self,
        backend: BackendKind,
        is_cancel: impl FnOnce(&HelperOutput) -> bool,
    ) -> Result<Option<OsString>> {
        let stderr = self.stderr.trim();

        if self.status.success() {
            if !stderr.is_empty() {
                tracing::warn!(target: targets::BACKEND, backend = %backend, "{}", stderr);
            }
            let selection = self.stdout.trim_ascii();
            if selection.is_empty() {
                return Ok(None);
            }
            return selection_from_bytes(backend, selection.to_vec()).map(Some);
        }

        if is_cancel(&self) {
            tracing::debug!(target: targets::BACKEND, backend = %backend, "Dialog cancelled");
            return Ok(None);
        }

        let detail = if stderr.is_empty() {
            String::new()
        } else {
            format!(": {stderr}")
        };
        Err(match self.status.code() {
            Some(code) => {
                DialogError::invocation(backend, format!("helper exited with status {code}{detail}"))
            }
            None => DialogError::invocation(
                backend,
                format!("helper was terminated by a signal{detail}"),
            ),
        })
    }
}

#[cfg(unix)]
fn selection_from_bytes(_backend: BackendKind, bytes: Vec<u8>) -> Result<OsString> {
    Ok(OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn selection_from_bytes(backend: BackendKind, bytes: Vec<u8>) -> Result<OsString> {
    String::from_utf8(bytes).map(OsString::from).map_err(|e| {
        DialogError::invocation(backend, format!("helper printed a path that is not UTF-8: {e}"))
    })
}
