//! Archive naming: `<stem>.tar.gz` for directories, `<stem>.zip` for files,
//! and the reverse mapping used to pick an extraction root.

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, OnceLock};

pub trait FileExtProvider {
    fn file_ext(&self) -> Option<Arc<str>>;
}

static TAR_GZ_FILE_EXT: OnceLock<Arc<str>> = OnceLock::new();
static ZIP_FILE_EXT: OnceLock<Arc<str>> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Whole directory trees, streamed.
    TarGz,
    /// Discrete file sets.
    Zip,
}

impl FileExtProvider for ArchiveKind {
    fn file_ext(&self) -> Option<Arc<str>> {
        let ext = match self {
            ArchiveKind::TarGz => TAR_GZ_FILE_EXT.get_or_init(|| "tar.gz".into()),
            ArchiveKind::Zip => ZIP_FILE_EXT.get_or_init(|| "zip".into()),
        };
        Some(ext.clone())
    }
}

impl ArchiveKind {
    fn ext(&self) -> Arc<str> {
        self.file_ext().unwrap_or_else(|| "".into())
    }

    /// `/data/report.txt` -> `report.zip`, `/data/photos` -> `photos.tar.gz`.
    /// Only the last extension of the source name is dropped.
    pub fn archive_file_name<P: AsRef<Path>>(&self, src: P) -> Result<String> {
        let src = src.as_ref();
        let stem = src.file_stem().ok_or_else(|| {
            Error::from(std::io::Error::other(format!("{src:?} has no file name")))
        })?;
        Ok(format!("{}.{}", stem.to_string_lossy(), self.ext()))
    }

    /// `/backup/photos.tar.gz` -> `/backup/photos`.
    pub fn extraction_root<P: AsRef<Path>>(&self, archive: P) -> Result<PathBuf> {
        let archive = archive.as_ref();
        let ext = self.ext();
        let suffix = format!(".{ext}");
        let unexpected = || Error::UnexpectedArchiveName {
            path: archive.to_path_buf(),
            expected_ext: ext.to_string(),
        };

        let file_name = archive
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(unexpected)?;
        match file_name.strip_suffix(suffix.as_str()) {
            Some(stem) if !stem.is_empty() => Ok(archive.with_file_name(stem)),
            _ => Err(unexpected()),
        }
    }
}

/// Stored member name for a filesystem path: components joined with `/`,
/// root and drive prefix removed.
pub fn entry_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .components()
        .filter_map(|c| match c {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => None,
            c => Some(c.as_os_str().to_string_lossy()),
        })
        .collect::<Vec<_>>()
        .join("/")
}
