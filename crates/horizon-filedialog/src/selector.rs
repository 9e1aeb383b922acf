//! Backend selection.
//!
//! [`HostEnvironment::detect`] takes a snapshot of everything selection
//! depends on (operating system, desktop session, helpers on `PATH`), and
//! [`select_backend`] turns that snapshot into exactly one [`Backend`]. The
//! split keeps the selection rules a pure function that can be tested with
//! any environment.

use std::path::PathBuf;

use crate::backend::{
    Backend, BackendKind, FileDialogBackend, KDialogBackend, OsascriptBackend, Win32Backend,
    ZenityBackend,
};
use crate::config::DialogConfig;
use crate::error::BackendUnavailable;
use crate::logging::targets;

/// Operating system families with a distinct dialog facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsFamily {
    /// Linux and the BSDs: dialogs come from a desktop helper.
    Freedesktop,
    /// macOS: dialogs come from AppleScript.
    MacOs,
    /// Windows: common dialog API.
    Windows,
    /// Anything else, with its name.
    Unknown(String),
}

impl OsFamily {
    /// The family of the running system.
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Map a [`std::env::consts::OS`] value to its family.
    pub fn from_os_name(os: &str) -> Self {
        match os {
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Self::Freedesktop,
            "macos" => Self::MacOs,
            "windows" => Self::Windows,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Short name for messages.
    pub fn name(&self) -> &str {
        match self {
            Self::Freedesktop => "freedesktop",
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Unknown(name) => name,
        }
    }
}

/// Toolkit family of the running desktop session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopHint {
    /// KDE Plasma.
    Kde,
    /// A GTK-based desktop.
    Gtk,
    /// Unknown or absent.
    Unknown,
}

impl DesktopHint {
    /// Derive the hint from `XDG_CURRENT_DESKTOP` (a colon-separated list)
    /// and `DESKTOP_SESSION`. The first recognized entry wins.
    pub fn from_session(xdg_current_desktop: Option<&str>, desktop_session: Option<&str>) -> Self {
        xdg_current_desktop
            .into_iter()
            .flat_map(|value| value.split(':'))
            .chain(desktop_session)
            .map(Self::from_token)
            .find(|hint| *hint != Self::Unknown)
            .unwrap_or(Self::Unknown)
    }

    fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "kde" | "plasma" => Self::Kde,
            "gnome" | "unity" | "xfce" | "cinnamon" | "x-cinnamon" | "mate" | "budgie"
            | "pantheon" | "lxde" | "ubuntu" => Self::Gtk,
            _ => Self::Unknown,
        }
    }

    /// Read the hint from the process environment.
    pub fn from_env() -> Self {
        let xdg = std::env::var("XDG_CURRENT_DESKTOP").ok();
        let session = std::env::var("DESKTOP_SESSION").ok();
        Self::from_session(xdg.as_deref(), session.as_deref())
    }
}

/// What backend selection depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    pub os: OsFamily,
    pub desktop: DesktopHint,
    /// Resolved path of `kdialog`, if installed.
    pub kdialog: Option<PathBuf>,
    /// Resolved path of `zenity`, if installed.
    pub zenity: Option<PathBuf>,
    /// Resolved path of `osascript`, if installed.
    pub osascript: Option<PathBuf>,
    /// Backend requested by configuration.
    pub forced: Option<BackendKind>,
}

impl HostEnvironment {
    /// An environment for `os` with no helpers and no desktop hint.
    pub fn new(os: OsFamily) -> Self {
        Self {
            os,
            desktop: DesktopHint::Unknown,
            kdialog: None,
            zenity: None,
            osascript: None,
            forced: None,
        }
    }

    /// Inspect the running system.
    pub fn detect(config: &DialogConfig) -> Self {
        let env = Self {
            os: OsFamily::current(),
            desktop: DesktopHint::from_env(),
            kdialog: which::which("kdialog").ok(),
            zenity: which::which("zenity").ok(),
            osascript: which::which("osascript").ok(),
            forced: config.backend,
        };
        tracing::debug!(
            target: targets::SELECTOR,
            os = env.os.name(),
            desktop = ?env.desktop,
            kdialog = env.kdialog.is_some(),
            zenity = env.zenity.is_some(),
            osascript = env.osascript.is_some(),
            forced = ?env.forced,
            "Detected host environment"
        );
        env
    }

    /// Set the desktop hint.
    pub fn desktop(mut self, desktop: DesktopHint) -> Self {
        self.desktop = desktop;
        self
    }

    /// Set the resolved `kdialog` path.
    pub fn kdialog(mut self, path: impl Into<PathBuf>) -> Self {
        self.kdialog = Some(path.into());
        self
    }

    /// Set the resolved `zenity` path.
    pub fn zenity(mut self, path: impl Into<PathBuf>) -> Self {
        self.zenity = Some(path.into());
        self
    }

    /// Set the resolved `osascript` path.
    pub fn osascript(mut self, path: impl Into<PathBuf>) -> Self {
        self.osascript = Some(path.into());
        self
    }

    /// Force a backend.
    pub fn forced(mut self, backend: Option<BackendKind>) -> Self {
        self.forced = backend;
        self
    }
}

/// Pick the backend for `env`.
///
/// - a forced backend is used when its helper is present
/// - freedesktop: with both helpers the desktop hint decides, otherwise
///   kdialog only when zenity is missing
/// - macOS: `osascript`
/// - Windows: the common dialog API
pub fn select_backend(env: &HostEnvironment) -> Result<Backend, BackendUnavailable> {
    let backend = match env.forced {
        Some(kind) => forced_backend(env, kind)?,
        None => detected_backend(env)?,
    };
    tracing::info!(
        target: targets::SELECTOR,
        backend = %backend.kind(),
        forced = env.forced.is_some(),
        "Selected file dialog backend"
    );
    Ok(backend)
}

fn forced_backend(env: &HostEnvironment, kind: BackendKind) -> Result<Backend, BackendUnavailable> {
    let missing = || BackendUnavailable::new(env.os.name(), kind.name());
    Ok(match kind {
        BackendKind::KDialog => {
            Backend::KDialog(KDialogBackend::new(env.kdialog.clone().ok_or_else(missing)?))
        }
        BackendKind::Zenity => {
            Backend::Zenity(ZenityBackend::new(env.zenity.clone().ok_or_else(missing)?))
        }
        BackendKind::Osascript => {
            Backend::Osascript(OsascriptBackend::new(env.osascript.clone().ok_or_else(missing)?))
        }
        BackendKind::Win32 if env.os == OsFamily::Windows => Backend::Win32(Win32Backend::new()),
        BackendKind::Win32 => return Err(missing()),
    })
}

fn detected_backend(env: &HostEnvironment) -> Result<Backend, BackendUnavailable> {
    match &env.os {
        OsFamily::Freedesktop => match (&env.kdialog, &env.zenity) {
            (Some(kdialog), Some(zenity)) => Ok(match env.desktop {
                DesktopHint::Kde => Backend::KDialog(KDialogBackend::new(kdialog)),
                DesktopHint::Gtk | DesktopHint::Unknown => {
                    Backend::Zenity(ZenityBackend::new(zenity))
                }
            }),
            (Some(kdialog), None) => Ok(Backend::KDialog(KDialogBackend::new(kdialog))),
            (None, Some(zenity)) => Ok(Backend::Zenity(ZenityBackend::new(zenity))),
            (None, None) => Err(BackendUnavailable::new(env.os.name(), "kdialog or zenity")),
        },
        OsFamily::MacOs => env
            .osascript
            .as_ref()
            .map(|path| Backend::Osascript(OsascriptBackend::new(path)))
            .ok_or_else(|| BackendUnavailable::new(env.os.name(), "osascript")),
        OsFamily::Windows => Ok(Backend::Win32(Win32Backend::new())),
        OsFamily::Unknown(name) => Err(BackendUnavailable::new(
            name.as_str(),
            format!("a supported dialog facility for {name}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_family_mapping() {
        assert_eq!(OsFamily::from_os_name("linux"), OsFamily::Freedesktop);
        assert_eq!(OsFamily::from_os_name("freebsd"), OsFamily::Freedesktop);
        assert_eq!(OsFamily::from_os_name("macos"), OsFamily::MacOs);
        assert_eq!(OsFamily::from_os_name("windows"), OsFamily::Windows);
        assert_eq!(
            OsFamily::from_os_name("haiku"),
            OsFamily::Unknown("haiku".into())
        );
    }

    #[test]
    fn test_desktop_hint() {
        assert_eq!(DesktopHint::from_session(Some("KDE"), None), DesktopHint::Kde);
        assert_eq!(
            DesktopHint::from_session(Some("ubuntu:GNOME"), None),
            DesktopHint::Gtk
        );
        assert_eq!(
            DesktopHint::from_session(Some("sway"), Some("plasma")),
            DesktopHint::Kde
        );
        assert_eq!(
            DesktopHint::from_session(Some("X-Cinnamon"), None),
            DesktopHint::Gtk
        );
        assert_eq!(DesktopHint::from_session(Some(""), None), DesktopHint::Unknown);
        assert_eq!(DesktopHint::from_session(None, None), DesktopHint::Unknown);
    }

    #[test]
    fn test_unknown_os_names_platform() {
        let err = select_backend(&HostEnvironment::new(OsFamily::Unknown("haiku".into())))
            .unwrap_err();
        assert_eq!(err.os, "haiku");
        assert!(err.missing.contains("haiku"));
    }

    #[test]
    fn test_forced_win32_requires_windows() {
        let env = HostEnvironment::new(OsFamily::Freedesktop).forced(Some(BackendKind::Win32));
        assert_eq!(select_backend(&env).unwrap_err().missing, "win32");

        let env = HostEnvironment::new(OsFamily::Windows).forced(Some(BackendKind::Win32));
        assert_eq!(select_backend(&env).unwrap().kind(), BackendKind::Win32);
    }
}
