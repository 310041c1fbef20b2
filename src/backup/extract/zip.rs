use crate::backup::counters::TransferCounters;
use crate::backup::extract::{common_ancestor, normalize_entry, set_mode, RootRemap};
use crate::backup::file_ext::ArchiveKind;
use crate::backup::options::TransferOptions;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::{convert_error_vec, Result};
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extracts the zip at `archive_path` into the sibling directory named after
/// it (`x.zip` -> `x/`).
///
/// Without an explicit `root`, members are remapped from the deepest folder
/// containing all of them; for a single file archive that is the file's own
/// folder. A member that cannot be opened is reported and skipped, and is
/// returned in the aggregate error. Failing to create or fill an output
/// file aborts the extraction.
pub fn extract_zip<P: AsRef<Path>>(
    archive_path: P,
    root: Option<&Path>,
    options: &TransferOptions,
) -> Result<(TransferCounters, Option<Error>)> {
    let archive_path = archive_path.as_ref();
    extract_zip_inner(archive_path, root, options)
        .with_debug_object_and_fn_name(archive_path.to_path_buf(), "extract_zip")
}

fn extract_zip_inner(
    archive_path: &Path,
    root: Option<&Path>,
    options: &TransferOptions,
) -> Result<(TransferCounters, Option<Error>)> {
    let dest = ArchiveKind::Zip.extraction_root(archive_path)?;
    let mut archive = File::open(archive_path)
        .map(BufReader::new)
        .map_err(Error::from)
        .and_then(|r| Ok(ZipArchive::new(r)?))
        .with_msg(format!("Opening zip {archive_path:?} failed"))?;
    tracing::info!(
        "Extracting {} members of {:?} into {:?}",
        archive.len(),
        archive_path,
        dest
    );
    fs::create_dir_all(&dest)?;

    let mut remap = RootRemap::new(&dest, root);
    if let Some(shared) = shared_parent(&archive) {
        remap.discover(&shared);
    }

    let mut counters = TransferCounters::default();
    let mut errors = Vec::new();
    for i in 0..archive.len() {
        let mut member = match archive.by_index(i) {
            Ok(member) => member,
            Err(e) => {
                let e = Error::from(e).with_msg(format!("Opening zip member {i} failed"));
                options.reporter().error(archive_path, &e);
                errors.push(e);
                continue;
            }
        };
        let stored = PathBuf::from(member.name());
        let target = remap.remap(&stored)?;

        if member.is_dir() {
            fs::create_dir_all(&target)
                .map_err(Error::from)
                .with_msg(format!("Creating {target:?} failed"))?;
            counters.folder();
        } else {
            let mode = member.unix_mode();
            write_member(&mut member, &target, mode)
                .with_msg(format!("Extracting {stored:?} to {target:?} failed"))?;
            counters.file();
            options.reporter().file_extracted(&target);
        }
    }

    tracing::info!(
        "Extracted {} folders and {} files from root {:?} into {:?}",
        counters.folders,
        counters.files,
        remap.root(),
        dest
    );
    Ok((counters, convert_error_vec(errors).err()))
}

/// Deepest folder holding every member. Members with unsafe names are left
/// out here and rejected when they are extracted.
fn shared_parent<R: Read + Seek>(archive: &ZipArchive<R>) -> Option<PathBuf> {
    common_ancestor(archive.file_names().filter_map(|name| {
        normalize_entry(Path::new(name))
            .ok()
            .map(|p| p.parent().map(Path::to_path_buf).unwrap_or_default())
    }))
}

/// The output file is closed before returning, on success and on error.
fn write_member<R: Read>(content: &mut R, path: &Path, mode: Option<u32>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    {
        let mut out = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        io::copy(content, &mut out)?;
    }
    if let Some(mode) = mode {
        set_mode(path, mode)?;
    }
    Ok(())
}
