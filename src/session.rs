//! Session-manager surface.
//!
//! A session manager can ask the viewer to hide its window and tells it where
//! to keep per-session data. Without one, [`StandaloneSession`] answers with
//! fixed fallbacks.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Queries and commands exchanged with a session manager
pub trait Session {
    /// Whether the window should be shown and drawn
    fn need_gui(&self) -> bool;

    /// Change GUI visibility (and report it to the manager, if any)
    fn set_gui(&mut self, show: bool);

    /// Manager description, `None` without a manager
    fn info(&self) -> Option<&str>;

    /// Where session data belongs
    fn storage_path(&self) -> &Path;

    /// Process pending manager messages
    fn poll_events(&mut self);

    /// False once the session asked the viewer to stop
    fn is_online(&self) -> bool;
}

/// Fallback used when no session manager is present
#[derive(Debug, Clone)]
pub struct StandaloneSession {
    show_gui: bool,
    storage: PathBuf,
}

impl StandaloneSession {
    pub fn new(app_name: &str) -> Self {
        Self::with_storage(default_storage_path(app_name))
    }

    pub fn with_storage(storage: PathBuf) -> Self {
        Self {
            show_gui: true,
            storage,
        }
    }
}

impl Session for StandaloneSession {
    fn need_gui(&self) -> bool {
        self.show_gui
    }

    fn set_gui(&mut self, show: bool) {
        self.show_gui = show;
    }

    fn info(&self) -> Option<&str> {
        None
    }

    fn storage_path(&self) -> &Path {
        &self.storage
    }

    fn poll_events(&mut self) {}

    /// Hiding the GUI without a manager means nobody can bring it back
    fn is_online(&self) -> bool {
        self.show_gui
    }
}

/// Platform data directory for `app_name`, or `~/.local/share/<app_name>/`
pub fn default_storage_path(app_name: &str) -> PathBuf {
    ProjectDirs::from("", "", app_name)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("~/.local/share/{}/", app_name)))
}
