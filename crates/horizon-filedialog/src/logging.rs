//! Logging targets for Horizon File Dialog.
//!
//! The crate logs through `tracing`. Install a subscriber in your application
//! to see the events:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_filedialog=debug")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Backend selection.
    pub const SELECTOR: &str = "horizon_filedialog::selector";
    /// Helper process and native API invocations.
    pub const BACKEND: &str = "horizon_filedialog::backend";
    /// Remembered starting directory.
    pub const MEMORY: &str = "horizon_filedialog::memory";
    /// Configuration loading.
    pub const CONFIG: &str = "horizon_filedialog::config";
}
