use crate::backup::counters::TransferCounters;
use crate::backup::extract::{set_mode, RootRemap};
use crate::backup::file_ext::ArchiveKind;
use crate::backup::options::TransferOptions;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Extracts the tar+gzip stream `input`, read from `archive_path`, into the
/// sibling directory named after the archive (`x.tar.gz` -> `x/`).
///
/// Members are remapped from `root`, or when absent from the first
/// directory member (a regular file seen first donates its parent instead).
/// Members other than directories and regular files are reported and
/// skipped. Anything else that goes wrong aborts the extraction; what was
/// already written stays in place.
pub fn extract_tar_gz<R: Read, P: AsRef<Path>>(
    input: R,
    archive_path: P,
    root: Option<&Path>,
    options: &TransferOptions,
) -> Result<TransferCounters> {
    let archive_path = archive_path.as_ref();
    extract_tar_gz_inner(input, archive_path, root, options)
        .with_debug_object_and_fn_name(archive_path.to_path_buf(), "extract_tar_gz")
}

fn extract_tar_gz_inner<R: Read>(
    input: R,
    archive_path: &Path,
    root: Option<&Path>,
    options: &TransferOptions,
) -> Result<TransferCounters> {
    let dest = ArchiveKind::TarGz.extraction_root(archive_path)?;
    tracing::info!("Extracting {:?} into {:?}", archive_path, dest);
    fs::create_dir_all(&dest)?;

    let mut remap = RootRemap::new(&dest, root);
    let mut counters = TransferCounters::default();
    let mut archive = tar::Archive::new(GzDecoder::new(input));

    for entry in archive
        .entries()
        .map_err(Error::from)
        .with_msg("Reading tar.gz stream failed")?
    {
        let mut entry = entry
            .map_err(Error::from)
            .with_msg("Reading tar.gz entry failed")?;
        let stored: PathBuf = entry.path()?.into_owned();
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            remap.discover(&stored);
            let dir = remap.remap(&stored)?;
            fs::create_dir_all(&dir)
                .map_err(Error::from)
                .with_msg(format!("Creating {dir:?} failed"))?;
            counters.folder();
        } else if entry_type.is_file() {
            remap.discover(stored.parent().unwrap_or(Path::new("")));
            let file = remap.remap(&stored)?;
            let mode = entry.header().mode().ok();
            write_entry(&mut entry, &file, mode)
                .with_msg(format!("Extracting {stored:?} to {file:?} failed"))?;
            counters.file();
            options.reporter().file_extracted(&file);
        } else {
            options.reporter().unknown_entry(&stored);
        }
    }

    // tar stops at its end marker, the gzip trailer is only checked once
    // the decoder is read to the end
    io::copy(&mut archive.into_inner(), &mut io::sink())
        .map_err(Error::from)
        .with_msg("Reading gzip trailer failed")?;

    tracing::info!(
        "Extracted {} folders and {} files from root {:?} into {:?}",
        counters.folders,
        counters.files,
        remap.root(),
        dest
    );
    Ok(counters)
}

/// Missing parent folders are created first, the file is truncated if it
/// already exists.
fn write_entry<R: Read>(content: &mut R, path: &Path, mode: Option<u32>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(path)?;
    io::copy(content, &mut out)?;
    if let Some(mode) = mode {
        set_mode(path, mode)?;
    }
    Ok(())
}
