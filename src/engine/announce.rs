// src/engine/announce.rs

//! User-facing notice printed before a change-triggered rebuild.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::select::path_utils::relative_str;

/// ANSI "erase display" followed by "cursor home".
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Writes `File changed: <path>` (relative to the project directory) before
/// every rebuild a change starts. The terminal is cleared first unless the
/// previous output should be preserved.
pub struct ChangeAnnouncer {
    cwd: PathBuf,
    clear_screen: bool,
    out: Box<dyn Write + Send>,
}

impl fmt::Debug for ChangeAnnouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeAnnouncer")
            .field("cwd", &self.cwd)
            .field("clear_screen", &self.clear_screen)
            .finish_non_exhaustive()
    }
}

impl ChangeAnnouncer {
    pub fn new(cwd: impl Into<PathBuf>, clear_screen: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            cwd: cwd.into(),
            clear_screen,
            out,
        }
    }

    /// Announce on stdout.
    pub fn stdout(cwd: impl Into<PathBuf>, preserve_output: bool) -> Self {
        Self::new(cwd, !preserve_output, Box::new(io::stdout()))
    }

    pub fn announce(&mut self, path: &Path) {
        let shown = relative_str(&self.cwd, path).unwrap_or_else(|| path.display().to_string());
        debug!(path = %shown, clear = self.clear_screen, "announcing change");

        let mut text = String::new();
        if self.clear_screen {
            text.push_str(CLEAR_SCREEN);
        }
        text.push_str(&change_line(&shown));
        text.push('\n');

        if let Err(err) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            debug!("cannot write change notice: {err}");
        }
    }
}

pub fn change_line(rel_path: &str) -> String {
    format!("File changed: {rel_path}")
}
