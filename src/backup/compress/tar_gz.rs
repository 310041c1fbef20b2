use crate::backup::file_ext::{entry_name, ArchiveKind};
use crate::backup::finish::Finish;
use crate::backup::options::TransferOptions;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{BufWriter, IntoInnerError, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Streams the tree under `src` as tar inside gzip into `out`.
///
/// Member names are the canonical full paths of the entries without the
/// leading `/`. Ignored entries and their subtrees are left out. Any
/// failure aborts the whole archive. On success both trailers are written
/// (tar first, then gzip) and `out` is handed back.
pub fn compress_directory<P: AsRef<Path>, W: Write>(
    src: P,
    out: W,
    options: &TransferOptions,
) -> Result<W> {
    let src = src.as_ref();
    compress_directory_inner(src, out, options)
        .with_debug_object_and_fn_name(src.to_path_buf(), "compress_directory")
}

fn compress_directory_inner<W: Write>(
    src: &Path,
    out: W,
    options: &TransferOptions,
) -> Result<W> {
    let src = src
        .canonicalize()
        .map_err(Error::from)
        .with_msg(format!("Resolving {src:?} failed"))?;
    if !src.is_dir() {
        return Err(Error::NotADirectory { path: src });
    }

    let mut writer = tar::Builder::new(GzEncoder::new(out, options.compression().gzip()));
    writer.follow_symlinks(false);

    let mut entry_count = 0;
    let walker = WalkDir::new(&src)
        .into_iter()
        .filter_entry(|de| !options.ignore().is_excluded(de.path()));
    for de in walker {
        let de = de?;
        let name = entry_name(de.path());
        tracing::trace!("Appending {:?} as {:?}", de.path(), name);
        writer
            .append_path_with_name(de.path(), &name)
            .map_err(Error::from)
            .with_msg(format!("Appending {:?} failed", de.path()))?;
        entry_count += 1;
    }
    tracing::info!("Processed {} archive entries", entry_count);

    let encoder = writer.into_inner()?;
    Ok(Finish::finish(encoder)?)
}

/// Archives `src` into `dst_dir/<stem>.tar.gz` and returns that path.
///
/// The archive is written to a `.tmp` sibling and only renamed into place
/// once both trailers are flushed and synced. On failure the tmp file is
/// removed.
pub fn archive_directory_into<P1: AsRef<Path>, P2: AsRef<Path>>(
    src: P1,
    dst_dir: P2,
    options: &TransferOptions,
) -> Result<PathBuf> {
    let src = src.as_ref();
    let file_name = ArchiveKind::TarGz.archive_file_name(src)?;
    let file_path = dst_dir.as_ref().join(&file_name);
    let file_path_tmp = dst_dir.as_ref().join(format!("{file_name}.tmp"));

    let res = File::create(&file_path_tmp)
        .map(BufWriter::new)
        .map_err(Error::from)
        .and_then(|writer| compress_directory(src, writer, options))
        .and_then(|writer| {
            writer
                .into_inner()
                .map_err(IntoInnerError::into_error)?
                .sync_all()?;
            Ok(fs::rename(&file_path_tmp, &file_path)?)
        });

    match res {
        Ok(()) => {
            tracing::info!("Created archive {:?}", file_path);
            Ok(file_path)
        }
        Err(mut e) => {
            if let Err(e2) = fs::remove_file(&file_path_tmp) {
                e = e.chain(e2.into());
            }
            Err(e.with_msg(format!("Creating {file_path:?} failed")))
        }
    }
}
