//! Event sink for copy and extraction progress.
//!
//! Every event goes through `tracing`, the subscriber installed by the binary
//! stamps it with a timestamp. Successful transfers are only reported when
//! `log_copied` is set, errors are always reported.

use crate::backup::result_error::error::Error;
use std::path::Path;
use tracing::{error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reporter {
    log_copied: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self { log_copied: true }
    }
}

impl Reporter {
    pub fn new(log_copied: bool) -> Self {
        Self { log_copied }
    }

    pub fn quiet() -> Self {
        Self::new(false)
    }

    pub fn file_copied(&self, src: &Path, dst: &Path) {
        if self.log_copied {
            info!(src = ?src, dst = ?dst, "copied_file");
        }
    }

    pub fn folder_copied(&self, src: &Path, dst: &Path) {
        if self.log_copied {
            info!(src = ?src, dst = ?dst, "copied_folder");
        }
    }

    pub fn file_extracted(&self, dst: &Path) {
        if self.log_copied {
            info!(dst = ?dst, "extracted_file");
        }
    }

    pub fn unknown_entry(&self, entry: &Path) {
        warn!(entry = ?entry, "unknown type");
    }

    pub fn error(&self, path: &Path, err: &Error) {
        error!(path = ?path, "{err}");
    }
}
