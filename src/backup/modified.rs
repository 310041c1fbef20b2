//! Copies only files modified within the last N days, while still creating
//! every (non-ignored) folder of the source tree at the destination.

use crate::backup::copy::{copy_file_contents, is_regular_file};
use crate::backup::counters::TransferCounters;
use crate::backup::options::TransferOptions;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::{convert_error_vec, Result};
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Inclusive `[start, end]` range of unix seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// `[now + days, now]`. `days` must not be positive, zero only matches
    /// files modified at `now` to the second.
    pub fn last_days(days: i64, now: DateTime<Utc>) -> Result<Self> {
        if days > 0 {
            return Err(Error::InvalidWindow { days });
        }
        let start = Duration::try_days(days)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(Error::InvalidWindow { days })?;
        Ok(Self {
            start: start.timestamp(),
            end: now.timestamp(),
        })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn contains(&self, mtime: SystemTime) -> bool {
        let secs = DateTime::<Utc>::from(mtime).timestamp();
        self.start <= secs && secs <= self.end
    }
}

/// Copies files under `src` modified in the last `window_days` days
/// (a negative count) to the same relative location under `dst`.
pub fn copy_modified_within<P1: AsRef<Path>, P2: AsRef<Path>>(
    src: P1,
    dst: P2,
    window_days: i64,
    options: &TransferOptions,
) -> Result<(TransferCounters, Option<Error>)> {
    let window = TimeWindow::last_days(window_days, Utc::now())?;
    copy_modified_in_window(src, dst, &window, options)
}

/// One walk collects folders and files, then the destination skeleton is
/// built before any file in the window is copied.
pub fn copy_modified_in_window<P1: AsRef<Path>, P2: AsRef<Path>>(
    src: P1,
    dst: P2,
    window: &TimeWindow,
    options: &TransferOptions,
) -> Result<(TransferCounters, Option<Error>)> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    if !src.is_dir() {
        tracing::error!(
            "Source directory does not exist or is not a directory: {:?}",
            src
        );
        return Err(Error::NotADirectory {
            path: src.to_path_buf(),
        }
        .with_debug_object_and_fn_name(src.to_path_buf(), "copy_modified_in_window"));
    }
    tracing::info!(
        "Copying files from {:?} modified between {} and {}",
        src,
        window.start,
        window.end
    );

    let mut counters = TransferCounters::default();
    let mut errors = Vec::new();
    let (folders, files) = collect_entries(src, options, &mut errors);
    tracing::debug!("Found {} folders and {} files", folders.len(), files.len());

    fs::create_dir_all(dst)
        .map_err(Error::from)
        .with_debug_object_and_fn_name(dst.to_path_buf(), "create_dir_all")?;
    for folder in &folders {
        if let Err(e) = remap(folder, src, dst).and_then(|d| Ok(fs::create_dir_all(d)?)) {
            options.reporter().error(folder, &e);
            errors.push(e.with_msg(format!("Creating folder for {folder:?} failed")));
        }
    }

    for file in &files {
        let mtime = match fs::metadata(file).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(e) => {
                let e = Error::from(e);
                options.reporter().error(file, &e);
                errors.push(e.with_msg(format!("Reading modified time of {file:?} failed")));
                continue;
            }
        };
        if !window.contains(mtime) {
            tracing::trace!("Skipping {:?}, modified outside window", file);
            continue;
        }

        let res = remap(file, src, dst).and_then(|d| copy_file_contents(file, &d).map(|_| d));
        match res {
            Ok(d) => {
                counters.file();
                options.reporter().file_copied(file, &d);
            }
            Err(e) => {
                options.reporter().error(file, &e);
                errors.push(e.with_msg(format!("Copying {file:?} failed")));
            }
        }
    }

    tracing::info!("Copied {} modified files from {:?}", counters.files, src);
    Ok((counters, convert_error_vec(errors).err()))
}

/// Depth-first walk partitioned into folders (root included) and regular
/// files. Other entry types are reported and skipped. Ignored entries and
/// everything below them are left out.
fn collect_entries(
    src: &Path,
    options: &TransferOptions,
    errors: &mut Vec<Error>,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut folders = Vec::new();
    let mut files = Vec::new();

    let walker = WalkDir::new(src)
        .into_iter()
        .filter_entry(|de| !options.ignore().is_excluded(de.path()));
    for res in walker {
        match res {
            Ok(de) if de.file_type().is_dir() => folders.push(de.into_path()),
            Ok(de) => match is_regular_file(de.path(), de.file_type()) {
                Ok(true) => files.push(de.into_path()),
                Ok(false) => options.reporter().unknown_entry(de.path()),
                Err(e) => {
                    options.reporter().error(de.path(), &e);
                    errors.push(e.with_msg(format!("Reading type of {:?} failed", de.path())));
                }
            },
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                let e = Error::from(e);
                options.reporter().error(&path, &e);
                errors.push(e);
            }
        }
    }

    (folders, files)
}

fn remap(path: &Path, src: &Path, dst: &Path) -> Result<PathBuf> {
    Ok(dst.join(path.strip_prefix(src)?))
}
