//! Plain directory and single file copies, no archive involved.

use crate::backup::counters::TransferCounters;
use crate::backup::options::TransferOptions;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::{convert_error_vec, Result};
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use std::fs::{self, DirBuilder, FileType, Metadata};
use std::path::{Path, PathBuf};

/// Recursively copies `src` into `dst`, skipping ignored entries.
///
/// Children are visited in directory listing order. A failing child is
/// reported and skipped, its siblings are still copied; those failures come
/// back aggregated in the second tuple element. Failing to read `src` itself
/// is the only fatal error.
pub fn copy_dir<P1: AsRef<Path>, P2: AsRef<Path>>(
    src: P1,
    dst: P2,
    options: &TransferOptions,
) -> Result<(TransferCounters, Option<Error>)> {
    let src = src.as_ref();
    let dst = dst.as_ref();
    tracing::info!("Copying directory {:?} to {:?}", src, dst);

    let mut counters = TransferCounters::default();
    let mut errors = Vec::new();
    copy_dir_inner(src, dst, options, &mut counters, &mut errors)
        .with_debug_object_and_fn_name(src.to_path_buf(), "copy_dir")?;

    tracing::info!(
        "Copied {} folders and {} files from {:?}",
        counters.folders,
        counters.files,
        src
    );
    Ok((counters, convert_error_vec(errors).err()))
}

fn copy_dir_inner(
    src: &Path,
    dst: &Path,
    options: &TransferOptions,
    counters: &mut TransferCounters,
    errors: &mut Vec<Error>,
) -> Result<()> {
    let src_metadata = fs::metadata(src)?;
    if !src_metadata.is_dir() {
        return Err(Error::NotADirectory {
            path: src.to_path_buf(),
        });
    }
    create_dir_like(dst, &src_metadata)?;

    for entry in fs::read_dir(src)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let e = Error::from(e).with_msg(format!("Listing {src:?} failed"));
                options.reporter().error(src, &e);
                errors.push(e);
                continue;
            }
        };

        let src_path = entry.path();
        if options.ignore().is_excluded(&src_path) {
            continue;
        }
        let dst_path = dst.join(entry.file_name());

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                let e = Error::from(e).with_msg(format!("Reading type of {src_path:?} failed"));
                options.reporter().error(&src_path, &e);
                errors.push(e);
                continue;
            }
        };
        let res = if file_type.is_dir() {
            copy_dir_inner(&src_path, &dst_path, options, counters, errors).map(|_| {
                counters.folder();
                options.reporter().folder_copied(&src_path, &dst_path);
            })
        } else {
            match is_regular_file(&src_path, file_type) {
                Ok(true) => copy_file_contents(&src_path, &dst_path).map(|_| {
                    counters.file();
                    options.reporter().file_copied(&src_path, &dst_path);
                }),
                Ok(false) => {
                    options.reporter().unknown_entry(&src_path);
                    continue;
                }
                Err(e) => Err(e),
            }
        };

        if let Err(e) = res {
            options.reporter().error(&src_path, &e);
            errors.push(e.with_msg(format!("Copying {src_path:?} failed")));
        }
    }

    Ok(())
}

/// Creates `dst` (and missing parents) with the permission bits of the
/// source directory, subject to the process umask.
fn create_dir_like(dst: &Path, src_metadata: &Metadata) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
        builder.mode(src_metadata.permissions().mode());
    }
    #[cfg(not(unix))]
    let _ = src_metadata;
    builder.create(dst)?;
    Ok(())
}

/// Regular files, and symlinks resolving to one. Pipes, sockets and device
/// nodes are not. A dangling symlink is an error.
pub(crate) fn is_regular_file(path: &Path, file_type: FileType) -> Result<bool> {
    if file_type.is_symlink() {
        return Ok(fs::metadata(path)?.is_file());
    }
    Ok(file_type.is_file())
}

/// Content and permission bits, timestamps are not carried over.
pub(crate) fn copy_file_contents(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)?;
    Ok(())
}

/// Copies a single file into `dst_dir`, keeping its file name. `dst_dir` is
/// created when missing. Returns the path written.
pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(
    src: P1,
    dst_dir: P2,
    options: &TransferOptions,
) -> Result<PathBuf> {
    let src = src.as_ref();
    let dst_dir = dst_dir.as_ref();
    let file_name = src.file_name().ok_or_else(|| {
        Error::from(std::io::Error::other(format!("{src:?} has no file name")))
    })?;
    let dst = dst_dir.join(file_name);

    fs::create_dir_all(dst_dir)
        .map_err(Error::from)
        .and_then(|_| copy_file_contents(src, &dst))
        .with_debug_object_and_fn_name(src.to_path_buf(), "copy_file")?;

    options.reporter().file_copied(src, &dst);
    Ok(dst)
}
