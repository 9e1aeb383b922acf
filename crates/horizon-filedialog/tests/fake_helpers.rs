//! End-to-end dialog calls against fake `kdialog`, `zenity` and `osascript`
//! scripts.
//!
//! Each script records its arguments and working directory next to itself,
//! prints canned output and exits with a canned status.

#![cfg(unix)]

use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use horizon_filedialog::backend::{KDialogBackend, OsascriptBackend, ZenityBackend};
use horizon_filedialog::{
    Backend, DialogConfig, DirectoryMemory, FileDialogs, FilterSpec, LabeledFilters,
};
use parking_lot::Mutex;
use tempfile::TempDir;

// Writing a script while another test forks can make exec fail with ETXTBSY.
static SERIAL: Mutex<()> = Mutex::new(());

struct FakeHelper {
    _dir: TempDir,
    root: PathBuf,
    script: PathBuf,
}

impl FakeHelper {
    fn new(name: &str, body: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let script = root.join(name);
        let contents = format!(
            "#!/bin/sh\n\
             for arg in \"$@\"; do printf '%s\\n' \"$arg\" >> \"$0.args\"; done\n\
             pwd > \"$0.cwd\"\n\
             {body}\n"
        );
        fs::write(&script, contents).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        Self {
            _dir: dir,
            root,
            script,
        }
    }

    /// A helper that prints `stdout` and exits with `code`.
    fn printing(name: &str, stdout: &str, code: i32) -> Self {
        Self::new(name, &format!("printf '%s\\n' '{stdout}'\nexit {code}"))
    }

    fn dir(&self, name: &str) -> PathBuf {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn args(&self) -> Option<Vec<String>> {
        let recorded = fs::read_to_string(self.script.with_extension("args")).ok()?;
        Some(recorded.lines().map(str::to_string).collect())
    }

    fn cwd(&self) -> PathBuf {
        let recorded = fs::read_to_string(self.script.with_extension("cwd")).unwrap();
        Path::new(recorded.trim()).canonicalize().unwrap()
    }

    fn zenity(&self, memory: DirectoryMemory) -> FileDialogs {
        FileDialogs::with_memory(
            Backend::Zenity(ZenityBackend::new(&self.script)),
            DialogConfig::default(),
            memory,
        )
    }

    fn kdialog(&self, memory: DirectoryMemory) -> FileDialogs {
        FileDialogs::with_memory(
            Backend::KDialog(KDialogBackend::new(&self.script)),
            DialogConfig::default(),
            memory,
        )
    }

    fn osascript(&self, memory: DirectoryMemory) -> FileDialogs {
        FileDialogs::with_memory(
            Backend::Osascript(OsascriptBackend::new(&self.script)),
            DialogConfig::default(),
            memory,
        )
    }
}

#[test]
fn test_result_updates_directory_memory() {
    let _guard = SERIAL.lock();
    let workspace = tempfile::tempdir().unwrap();
    let docs = workspace.path().canonicalize().unwrap().join("docs");
    fs::create_dir(&docs).unwrap();
    let report = docs.join("report.pdf");

    let helper = FakeHelper::printing("zenity", &report.to_string_lossy(), 0);
    let dialogs = helper.zenity(DirectoryMemory::new());

    let first = dialogs.open_file(None, None, None).unwrap();
    assert_eq!(first, Some(report.clone()));
    assert_eq!(
        helper.args().unwrap(),
        vec!["--file-selection", "--title=Choose a file"]
    );
    assert_eq!(dialogs.memory().last(), Some(docs.clone()));

    fs::remove_file(helper.script.with_extension("args")).unwrap();
    dialogs.open_file(Some("Again"), None, None).unwrap();
    let args = helper.args().unwrap();
    assert!(args.contains(&format!("--filename={}/", docs.display())));
    assert!(args.contains(&"--title=Again".to_string()));
    assert_eq!(helper.cwd(), docs);
}

#[test]
fn test_override_beats_memory_and_explicit_beats_override() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::printing("zenity", "/elsewhere/picked.txt", 0);
    let pinned = helper.dir("pinned");
    let explicit = helper.dir("explicit");
    let dialogs = helper.zenity(DirectoryMemory::with_override(&pinned));

    dialogs.open_file(None, None, None).unwrap();
    assert_eq!(dialogs.memory().last(), Some(PathBuf::from("/elsewhere")));

    fs::remove_file(helper.script.with_extension("args")).unwrap();
    dialogs.save_file(None, None).unwrap();
    let args = helper.args().unwrap();
    assert!(args.contains(&format!("--filename={}/", pinned.display())));

    fs::remove_file(helper.script.with_extension("args")).unwrap();
    dialogs.choose_folder(None, Some(&explicit)).unwrap();
    let args = helper.args().unwrap();
    assert!(args.contains(&format!("--filename={}/", explicit.display())));
    assert!(args.contains(&"--title=Choose a folder".to_string()));
}

#[test]
fn test_cancel_returns_nothing_and_keeps_memory() {
    let _guard = SERIAL.lock();
    let memory = DirectoryMemory::new();
    memory.remember(Path::new("/kept/file.txt"));

    let cancelled = FakeHelper::new("zenity", "exit 1");
    let dialogs = cancelled.zenity(memory.clone());
    assert_eq!(dialogs.open_file(None, None, None).unwrap(), None);
    assert!(dialogs.open_multiple(None, None, None).unwrap().is_empty());

    let empty = FakeHelper::new("kdialog", "exit 0");
    let dialogs = empty.kdialog(memory.clone());
    assert_eq!(dialogs.choose_folder(None, None).unwrap(), None);

    assert_eq!(memory.last(), Some(PathBuf::from("/kept")));
}

#[test]
fn test_unexpected_exit_is_fatal() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::new("kdialog", "echo 'cannot connect to display' >&2\nexit 3");
    let err = helper
        .kdialog(DirectoryMemory::new())
        .open_file(None, None, None)
        .unwrap_err();
    assert!(err.is_invocation_failure());
    assert!(err.to_string().contains("status 3"));
    assert!(err.to_string().contains("cannot connect to display"));
}

#[test]
fn test_killed_helper_is_fatal() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::new("zenity", "kill -9 $$");
    let err = helper
        .zenity(DirectoryMemory::new())
        .save_file(None, None)
        .unwrap_err();
    assert!(err.is_invocation_failure());
    assert!(err.to_string().contains("terminated by a signal"));
}

#[test]
fn test_diagnostics_do_not_fail_a_selection() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::new(
        "zenity",
        "echo 'Gtk-Message: GtkDialog mapped without a transient parent' >&2\n\
         echo /tmp/chosen.txt",
    );
    let result = helper
        .zenity(DirectoryMemory::new())
        .open_file(None, None, None)
        .unwrap();
    assert_eq!(result, Some(PathBuf::from("/tmp/chosen.txt")));
}

#[test]
fn test_invalid_filter_never_invokes_helper() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::printing("kdialog", "/tmp/x.txt", 0);
    let filter = FilterSpec::Groups(vec![vec!["*.py".into()], vec![]]);

    let err = helper
        .kdialog(DirectoryMemory::new())
        .open_multiple(None, None, Some(&filter))
        .unwrap_err();
    assert!(err.is_invalid_filter());
    assert_eq!(helper.args(), None);
}

#[test]
fn test_kdialog_labeled_filter_and_space_split() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::printing("kdialog", "/a/b.txt /a/c.txt", 0);
    let start = helper.dir("start");
    let filter = LabeledFilters::new()
        .entry("PDF-Files", "*.pdf")
        .entry("Scripts", ["*.py", "*.md"])
        .build();

    let result = helper
        .kdialog(DirectoryMemory::new())
        .open_multiple(Some("Pick"), Some(&start), Some(&filter))
        .unwrap();
    assert_eq!(result, vec![PathBuf::from("/a/b.txt"), PathBuf::from("/a/c.txt")]);
    assert_eq!(
        helper.args().unwrap(),
        vec![
            "--getopenfilename".to_string(),
            "--multiple".to_string(),
            start.display().to_string(),
            "PDF-Files (*.pdf) | Scripts (*.py *.md)".to_string(),
            "--title".to_string(),
            "Pick".to_string(),
        ]
    );
    assert_eq!(helper.cwd(), start);
}

#[test]
fn test_zenity_pipe_split_keeps_spaces() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::printing("zenity", "/a/my file.txt|/a/c.txt", 0);
    let dialogs = helper.zenity(DirectoryMemory::new());

    let filter = FilterSpec::groups(vec![vec!["*.txt"], vec!["*.png", "*.jpg"]]);

    let result = dialogs.open_multiple(None, None, Some(&filter)).unwrap();
    assert_eq!(
        result,
        vec![PathBuf::from("/a/my file.txt"), PathBuf::from("/a/c.txt")]
    );
    assert_eq!(dialogs.memory().last(), Some(PathBuf::from("/a")));

    let args = helper.args().unwrap();
    assert_eq!(
        &args[args.len() - 2..],
        ["--file-filter=*.txt", "--file-filter=*.png *.jpg"]
    );
}

#[test]
fn test_non_utf8_selection_is_returned_verbatim() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::new("zenity", "printf '/tmp/caf\\351.txt\\n'");
    let dialogs = helper.zenity(DirectoryMemory::new());

    let result = dialogs.open_file(None, None, None).unwrap();
    assert_eq!(
        result,
        Some(PathBuf::from(OsStr::from_bytes(b"/tmp/caf\xe9.txt")))
    );
    assert_eq!(dialogs.memory().last(), Some(PathBuf::from("/tmp")));
}

#[test]
fn test_osascript_user_cancel_returns_nothing() {
    let _guard = SERIAL.lock();
    let memory = DirectoryMemory::new();
    memory.remember(Path::new("/Users/me/kept.txt"));

    let helper = FakeHelper::new(
        "osascript",
        "echo '0:31: execution error: User canceled. (-128)' >&2\nexit 1",
    );
    let dialogs = helper.osascript(memory.clone());
    assert_eq!(dialogs.open_file(None, None, None).unwrap(), None);
    assert!(dialogs.open_multiple(None, None, None).unwrap().is_empty());
    assert_eq!(memory.last(), Some(PathBuf::from("/Users/me")));
}

#[test]
fn test_osascript_other_error_is_fatal() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::new(
        "osascript",
        "echo '0:12: execution error: Expected file reference. (-1700)' >&2\nexit 1",
    );
    let err = helper
        .osascript(DirectoryMemory::new())
        .save_file(None, None)
        .unwrap_err();
    assert!(err.is_invocation_failure());
    assert!(err.to_string().contains("-1700"));
}

#[test]
fn test_osascript_comma_joined_selection() {
    let _guard = SERIAL.lock();
    let helper = FakeHelper::printing("osascript", "/Users/me/a.txt, /Users/me/b c.txt", 0);
    let dialogs = helper.osascript(DirectoryMemory::new());

    let result = dialogs.open_multiple(Some("Pick"), None, None).unwrap();
    assert_eq!(
        result,
        vec![PathBuf::from("/Users/me/a.txt"), PathBuf::from("/Users/me/b c.txt")]
    );
    assert_eq!(dialogs.memory().last(), Some(PathBuf::from("/Users/me")));

    let args = helper.args().unwrap();
    assert_eq!(args[0], "-e");
    assert!(args[1].starts_with("set chosen to choose file with prompt \"Pick\""));
}
