//! Windows backend using the common dialog API.
//!
//! - open/save: `GetOpenFileNameW` / `GetSaveFileNameW` in Explorer style
//! - folders: `SHBrowseForFolderW` rooted at the desktop
//!
//! With `OFN_ALLOWMULTISELECT` the result buffer holds the directory followed
//! by the selected file names, each null-terminated, with an extra null at the
//! end. A single selection is returned as one full path.

use std::path::{Path, PathBuf};

use super::{BackendKind, DialogRequest, FileDialogBackend};
use crate::error::Result;

/// Size of the result buffer in UTF-16 units, large enough for long
/// multi-selections.
pub const RESULT_BUFFER_LEN: usize = 32 * 1024;

/// Drives the Win32 common dialogs.
#[derive(Debug, Clone, Default)]
pub struct Win32Backend {
    _private: (),
}

impl Win32Backend {
    /// Create the backend.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Where the folder browser starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderStart {
    /// Pre-select this directory.
    Directory(PathBuf),
    /// Open at the desktop root.
    Desktop,
}

/// Resolve the folder browser's start: the request's directory (explicit or
/// remembered), else the desktop.
pub fn folder_start(start_dir: Option<&Path>) -> FolderStart {
    match start_dir {
        Some(dir) if !dir.as_os_str().is_empty() => FolderStart::Directory(dir.to_path_buf()),
        _ => FolderStart::Desktop,
    }
}

/// Split a null-delimited result buffer into its segments.
///
/// Reading stops at the first empty segment (the double-null terminator).
pub fn split_buffer(buffer: &[u16]) -> Vec<String> {
    buffer
        .split(|&unit| unit == 0)
        .take_while(|segment| !segment.is_empty())
        .map(String::from_utf16_lossy)
        .collect()
}

/// Rebuild full paths from result segments.
///
/// One segment is a full path. With several, the first is the directory and
/// the rest are file names inside it.
pub fn parse_selection<S: AsRef<str>>(segments: &[S]) -> Vec<PathBuf> {
    match segments {
        [] => Vec::new(),
        [single] => vec![PathBuf::from(single.as_ref())],
        [dir, names @ ..] => names
            .iter()
            .map(|name| PathBuf::from(join(dir.as_ref(), name.as_ref())))
            .collect(),
    }
}

/// Parse a null-delimited multi-selection given as text.
pub fn parse_multiple(raw: &str) -> Vec<PathBuf> {
    let segments: Vec<&str> = raw.split('\0').take_while(|s| !s.is_empty()).collect();
    parse_selection(&segments)
}

fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('\\') {
        format!("{dir}{name}")
    } else {
        format!("{dir}\\{name}")
    }
}

/// Encode a string as a null-terminated UTF-16 buffer.
pub fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

impl FileDialogBackend for Win32Backend {
    fn kind(&self) -> BackendKind {
        BackendKind::Win32
    }

    fn open_file(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        let filter = request.filter.map(|f| f.to_win32()).transpose()?;
        Ok(platform::file_dialog(request, filter.as_deref(), platform::Mode::Open)?
            .and_then(|segments| parse_selection(&segments).into_iter().next()))
    }

    fn open_multiple(&self, request: &DialogRequest<'_>) -> Result<Vec<PathBuf>> {
        let filter = request.filter.map(|f| f.to_win32()).transpose()?;
        Ok(
            platform::file_dialog(request, filter.as_deref(), platform::Mode::OpenMultiple)?
                .map(|segments| parse_selection(&segments))
                .unwrap_or_default(),
        )
    }

    fn save_file(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        Ok(platform::file_dialog(request, None, platform::Mode::Save)?
            .and_then(|segments| parse_selection(&segments).into_iter().next()))
    }

    fn choose_folder(&self, request: &DialogRequest<'_>) -> Result<Option<PathBuf>> {
        platform::browse_for_folder(request.title, &folder_start(request.start_dir))
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use std::path::PathBuf;

    use windows::Win32::Foundation::{HANDLE, HWND, LPARAM, MAX_PATH, WPARAM};
    use windows::Win32::System::Com::{
        CoInitializeEx, CoTaskMemFree, COINIT_APARTMENTTHREADED, COINIT_DISABLE_OLE1DDE,
    };
    use windows::Win32::UI::Controls::Dialogs::{
        CommDlgExtendedError, GetOpenFileNameW, GetSaveFileNameW, OFN_ALLOWMULTISELECT,
        OFN_EXPLORER, OFN_OVERWRITEPROMPT, OPENFILENAMEW,
    };
    use windows::Win32::UI::Shell::{
        SHBrowseForFolderW, SHGetFolderLocation, SHGetPathFromIDListW, BFFM_INITIALIZED,
        BFFM_SETSELECTIONW, BIF_NEWDIALOGSTYLE, BIF_RETURNONLYFSDIRS, BROWSEINFOW, CSIDL_DESKTOP,
    };
    use windows::Win32::UI::WindowsAndMessaging::{GetDesktopWindow, SendMessageW};
    use windows::core::{PCWSTR, PWSTR};

    use super::{split_buffer, wide, FolderStart, RESULT_BUFFER_LEN};
    use crate::backend::{BackendKind, DialogRequest};
    use crate::error::{DialogError, Result};
    use crate::logging::targets;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(super) enum Mode {
        Open,
        OpenMultiple,
        Save,
    }

    pub(super) fn file_dialog(
        request: &DialogRequest<'_>,
        filter: Option<&str>,
        mode: Mode,
    ) -> Result<Option<Vec<String>>> {
        let title = wide(request.title);
        let initial_dir = request.start_dir.map(|d| wide(&d.to_string_lossy()));
        // The filter already carries its double-null terminator.
        let filter: Option<Vec<u16>> = filter.map(|f| f.encode_utf16().collect());
        let mut buffer = vec![0u16; RESULT_BUFFER_LEN];

        let mut flags = OFN_EXPLORER;
        match mode {
            Mode::Open => {}
            Mode::OpenMultiple => flags |= OFN_ALLOWMULTISELECT,
            Mode::Save => flags |= OFN_OVERWRITEPROMPT,
        }

        let mut ofn = OPENFILENAMEW {
            lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
            lpstrTitle: PCWSTR(title.as_ptr()),
            lpstrFile: PWSTR(buffer.as_mut_ptr()),
            nMaxFile: buffer.len() as u32,
            lpstrInitialDir: initial_dir
                .as_ref()
                .map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr())),
            lpstrFilter: filter
                .as_ref()
                .map_or(PCWSTR::null(), |f| PCWSTR(f.as_ptr())),
            Flags: flags,
            ..Default::default()
        };

        tracing::debug!(target: targets::BACKEND, backend = %BackendKind::Win32, ?mode, "Showing common dialog");

        // SAFETY: every pointer in `ofn` refers to a buffer that outlives the call.
        let accepted = unsafe {
            match mode {
                Mode::Save => GetSaveFileNameW(&mut ofn),
                _ => GetOpenFileNameW(&mut ofn),
            }
        };

        if accepted.as_bool() {
            return Ok(Some(split_buffer(&buffer)));
        }

        // SAFETY: no preconditions.
        let code = unsafe { CommDlgExtendedError() };
        if code.0 == 0 {
            Ok(None)
        } else {
            Err(DialogError::invocation(
                BackendKind::Win32,
                format!("common dialog error 0x{:04x}", code.0),
            ))
        }
    }

    unsafe extern "system" fn browse_callback(
        hwnd: HWND,
        msg: u32,
        _lparam: LPARAM,
        data: LPARAM,
    ) -> i32 {
        if msg == BFFM_INITIALIZED && data.0 != 0 {
            // SAFETY: `data` points at the null-terminated start directory
            // owned by `browse_for_folder` for the dialog's lifetime.
            unsafe {
                SendMessageW(hwnd, BFFM_SETSELECTIONW, WPARAM(1), data);
            }
        }
        0
    }

    pub(super) fn browse_for_folder(title: &str, start: &FolderStart) -> Result<Option<PathBuf>> {
        // SAFETY: COM may already be initialized on this thread; that is fine.
        unsafe {
            let _ = CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE);
        }

        // SAFETY: CSIDL_DESKTOP always resolves; the returned PIDL is freed below.
        let root = unsafe {
            SHGetFolderLocation(HWND::default(), CSIDL_DESKTOP as i32, HANDLE::default(), 0)
        }
        .map_err(|e| {
            DialogError::invocation(BackendKind::Win32, format!("cannot locate desktop: {e}"))
        })?;

        let title = wide(title);
        let selection = match start {
            FolderStart::Directory(dir) => Some(wide(&dir.to_string_lossy())),
            FolderStart::Desktop => None,
        };
        let mut display_name = vec![0u16; MAX_PATH as usize];

        let info = BROWSEINFOW {
            // SAFETY: no preconditions.
            hwndOwner: unsafe { GetDesktopWindow() },
            pidlRoot: root,
            pszDisplayName: PWSTR(display_name.as_mut_ptr()),
            lpszTitle: PCWSTR(title.as_ptr()),
            ulFlags: BIF_RETURNONLYFSDIRS | BIF_NEWDIALOGSTYLE,
            lpfn: Some(browse_callback),
            lParam: LPARAM(selection.as_ref().map_or(0, |s| s.as_ptr() as isize)),
            iImage: 0,
        };

        tracing::debug!(target: targets::BACKEND, backend = %BackendKind::Win32, "Showing folder browser");

        // SAFETY: `info` and the buffers it points to outlive the call.
        let pidl = unsafe { SHBrowseForFolderW(&info) };
        // SAFETY: `root` was allocated by the shell.
        unsafe { CoTaskMemFree(Some(root as *const _)) };

        if pidl.is_null() {
            return Ok(None);
        }

        let mut path = [0u16; MAX_PATH as usize];
        // SAFETY: `pidl` is a valid item list returned by the shell.
        let resolved = unsafe { SHGetPathFromIDListW(pidl, &mut path) };
        // SAFETY: `pidl` was allocated by the shell.
        unsafe { CoTaskMemFree(Some(pidl as *const _)) };

        if !resolved.as_bool() {
            return Err(DialogError::invocation(
                BackendKind::Win32,
                "selected folder is not a file system directory",
            ));
        }

        Ok(split_buffer(&path).into_iter().next().map(PathBuf::from))
    }
}

#[cfg(not(target_os = "windows"))]
mod platform {
    use std::path::PathBuf;

    use super::FolderStart;
    use crate::backend::{BackendKind, DialogRequest};
    use crate::error::{DialogError, Result};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(super) enum Mode {
        Open,
        OpenMultiple,
        Save,
    }

    fn unsupported() -> DialogError {
        DialogError::invocation(
            BackendKind::Win32,
            "Win32 common dialogs are only available on Windows",
        )
    }

    pub(super) fn file_dialog(
        _request: &DialogRequest<'_>,
        _filter: Option<&str>,
        _mode: Mode,
    ) -> Result<Option<Vec<String>>> {
        Err(unsupported())
    }

    pub(super) fn browse_for_folder(_title: &str, _start: &FolderStart) -> Result<Option<PathBuf>> {
        Err(unsupported())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_joins_directory() {
        assert_eq!(
            parse_multiple("C:\\dir\0a.txt\0b.txt"),
            vec![PathBuf::from("C:\\dir\\a.txt"), PathBuf::from("C:\\dir\\b.txt")]
        );
    }

    #[test]
    fn test_parse_single_selection() {
        assert_eq!(
            parse_multiple("C:\\dir\\only.txt\0\0"),
            vec![PathBuf::from("C:\\dir\\only.txt")]
        );
        assert!(parse_multiple("").is_empty());
    }

    #[test]
    fn test_drive_root_is_not_doubled() {
        assert_eq!(
            parse_multiple("C:\\\0a.txt\0b.txt\0\0"),
            vec![PathBuf::from("C:\\a.txt"), PathBuf::from("C:\\b.txt")]
        );
    }

    #[test]
    fn test_split_buffer_stops_at_double_null() {
        let mut buffer = Vec::new();
        for segment in ["C:\\dir", "a.txt", "b.txt"] {
            buffer.extend(wide(segment));
        }
        buffer.extend([0, 0, 0]);
        buffer.extend(wide("stale"));

        assert_eq!(split_buffer(&buffer), vec!["C:\\dir", "a.txt", "b.txt"]);
        assert!(split_buffer(&[0u16; 8]).is_empty());
    }

    #[test]
    fn test_folder_start_priority() {
        assert_eq!(
            folder_start(Some(Path::new("C:\\work"))),
            FolderStart::Directory(PathBuf::from("C:\\work"))
        );
        assert_eq!(folder_start(Some(Path::new(""))), FolderStart::Desktop);
        assert_eq!(folder_start(None), FolderStart::Desktop);
    }

    #[test]
    fn test_wide_is_null_terminated() {
        assert_eq!(wide("ab"), vec![97, 98, 0]);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_unavailable_off_windows() {
        let err = Win32Backend::new()
            .open_file(&DialogRequest::new("Pick"))
            .unwrap_err();
        assert!(err.is_invocation_failure());
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_invalid_filter_reported_before_platform_check() {
        let filter = crate::filter::FilterSpec::Groups(vec![]);
        let err = Win32Backend::new()
            .open_multiple(&DialogRequest::new("Pick").filter(Some(&filter)))
            .unwrap_err();
        assert!(err.is_invalid_filter());
    }
}
