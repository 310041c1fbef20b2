use crate::backup::file_ext::{entry_name, ArchiveKind};
use crate::backup::finish::Finish;
use crate::backup::options::TransferOptions;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use std::fs::File;
use std::io::{BufWriter, IntoInnerError, Seek, Write};
use std::path::{Path, PathBuf};
use zip::ZipWriter;

/// Bundles `files` into a new deflate zip archive at `dest`.
///
/// Each member is named after the canonical full path of its file (without
/// the leading `/`), not just the base name. The first file that cannot be
/// read aborts the whole archive; the archive file is closed on every path.
pub fn compress_files<P: AsRef<Path>, F: AsRef<Path>>(
    dest: P,
    files: &[F],
    options: &TransferOptions,
) -> Result<()> {
    let dest = dest.as_ref();
    let res = File::create(dest)
        .map(BufWriter::new)
        .map(ZipWriter::new)
        .map_err(Error::from)
        .and_then(|zip| write_files(zip, files, options))
        .and_then(|writer| {
            writer
                .into_inner()
                .map_err(IntoInnerError::into_error)?
                .sync_all()?;
            Ok(())
        });
    res.with_debug_object_and_fn_name(dest.to_path_buf(), "compress_files")
}

/// Zips the single file `src` into `dst_dir/<stem>.zip` and returns that
/// path.
pub fn archive_file_into<P1: AsRef<Path>, P2: AsRef<Path>>(
    src: P1,
    dst_dir: P2,
    options: &TransferOptions,
) -> Result<PathBuf> {
    let src = src.as_ref();
    let dest = dst_dir
        .as_ref()
        .join(ArchiveKind::Zip.archive_file_name(src)?);
    compress_files(&dest, &[src], options)?;
    tracing::info!("Created archive {:?}", dest);
    Ok(dest)
}

fn write_files<W: Write + Seek, F: AsRef<Path>>(
    mut zip: ZipWriter<W>,
    files: &[F],
    options: &TransferOptions,
) -> Result<W> {
    let zip_options = options.compression().zip_options();

    for file in files {
        let file = file.as_ref();
        add_file(&mut zip, file, zip_options)
            .with_msg(format!("Adding {file:?} to zip failed"))?;
    }
    tracing::info!("Processed {} archive entries", files.len());

    Ok(Finish::finish(zip)?)
}

fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &Path,
    zip_options: zip::write::SimpleFileOptions,
) -> Result<()> {
    let path = path.canonicalize()?;
    let mut src = File::open(&path)?;
    let metadata = src.metadata()?;
    if metadata.is_dir() {
        return Err(std::io::Error::other(format!("{path:?} is a directory")).into());
    }

    #[cfg(unix)]
    let zip_options = {
        use std::os::unix::fs::PermissionsExt;
        zip_options.unix_permissions(metadata.permissions().mode())
    };

    let name = entry_name(&path);
    tracing::trace!("Appending {:?} as {:?}", path, name);
    zip.start_file(name, zip_options)?;
    std::io::copy(&mut src, zip)?;
    Ok(())
}
