//! Restoring archives next to themselves: `photos.tar.gz` is extracted into
//! `photos/`, with each member's original root replaced by that directory.

pub mod tar_gz;
pub mod zip;

use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use getset::Getters;
use std::path::{Component, Path, PathBuf};

/// Rewrites stored member paths from their original root to the
/// extraction root.
///
/// The original root is either supplied by the caller or discovered from
/// the archive: tar uses its first directory member, zip the deepest folder
/// shared by all members. Member `home/u/photos/2024/a.jpg` with root
/// `home/u/photos` and destination `/restore/photos` lands at
/// `/restore/photos/2024/a.jpg`.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
pub struct RootRemap {
    #[getset(get = "pub")]
    root: Option<PathBuf>,
    dest: PathBuf,
}

impl RootRemap {
    /// An explicit `root` may be given with or without its leading `/`.
    pub fn new<P: Into<PathBuf>>(dest: P, root: Option<&Path>) -> Self {
        Self {
            root: root.map(strip_root),
            dest: dest.into(),
        }
    }

    /// Records `root` unless one is already known. Returns whether it was
    /// taken.
    pub fn discover(&mut self, root: &Path) -> bool {
        if self.root.is_some() {
            return false;
        }
        let root = strip_root(root);
        tracing::debug!("Using {:?} as archive root", root);
        self.root = Some(root);
        true
    }

    /// Destination for a stored member path. Without a known root the
    /// whole member path is kept below the destination.
    pub fn remap<P: AsRef<Path>>(&self, entry: P) -> Result<PathBuf> {
        let entry = normalize_entry(entry.as_ref())?;
        let relative = match &self.root {
            Some(root) => entry
                .strip_prefix(root)
                .map_err(|_| Error::EntryOutsideRoot {
                    entry: entry.clone(),
                    root: root.clone(),
                })?,
            None => entry.as_path(),
        };
        Ok(self.dest.join(relative))
    }
}

fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir | Component::CurDir))
        .collect()
}

/// Relative form of a stored member path. `..` is refused so that no member
/// can land outside the destination.
pub(crate) fn normalize_entry(entry: &Path) -> Result<PathBuf> {
    if entry.components().any(|c| c == Component::ParentDir) {
        return Err(Error::UnsafeEntryPath {
            entry: entry.to_path_buf(),
        });
    }
    Ok(strip_root(entry))
}

/// Longest shared leading path of `paths`, empty when they share nothing.
pub(crate) fn common_ancestor<I: IntoIterator<Item = PathBuf>>(paths: I) -> Option<PathBuf> {
    paths.into_iter().reduce(|acc, p| {
        acc.components()
            .zip(p.components())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a)
            .collect()
    })
}

#[cfg(unix)]
pub(crate) fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o7777))?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_replaces_root() {
        let remap = RootRemap::new("/restore/photos", Some(Path::new("home/u/photos")));
        assert_eq!(
            remap.remap("home/u/photos/2024/a.jpg").unwrap(),
            PathBuf::from("/restore/photos/2024/a.jpg")
        );
        assert_eq!(
            remap.remap("home/u/photos/").unwrap(),
            PathBuf::from("/restore/photos")
        );
    }

    #[test]
    fn test_explicit_absolute_root_matches_relative_members() {
        let remap = RootRemap::new("/restore/photos", Some(Path::new("/home/u/photos")));
        assert_eq!(remap.root().as_deref(), Some(Path::new("home/u/photos")));
        assert_eq!(
            remap.remap("home/u/photos/a.jpg").unwrap(),
            PathBuf::from("/restore/photos/a.jpg")
        );
    }

    #[test]
    fn test_discover_only_once() {
        let mut remap = RootRemap::new("/restore", None);
        assert!(remap.discover(Path::new("data/first")));
        assert!(!remap.discover(Path::new("data/second")));
        assert_eq!(remap.root().as_deref(), Some(Path::new("data/first")));
    }

    #[test]
    fn test_explicit_root_wins_over_discovery() {
        let mut remap = RootRemap::new("/restore", Some(Path::new("data")));
        assert!(!remap.discover(Path::new("data/first")));
        assert_eq!(remap.root().as_deref(), Some(Path::new("data")));
    }

    #[test]
    fn test_member_outside_root_fails() {
        let remap = RootRemap::new("/restore", Some(Path::new("data/photos")));
        match remap.remap("data/music/song.mp3") {
            Err(Error::EntryOutsideRoot { entry, root }) => {
                assert_eq!(entry, PathBuf::from("data/music/song.mp3"));
                assert_eq!(root, PathBuf::from("data/photos"));
            }
            other => panic!("Expected EntryOutsideRoot, got {other:?}"),
        }
    }

    #[test]
    fn test_root_is_matched_by_component() {
        let remap = RootRemap::new("/restore", Some(Path::new("data/photo")));
        assert!(remap.remap("data/photos/a.jpg").is_err());
    }

    #[test]
    fn test_parent_dir_member_rejected() {
        let remap = RootRemap::new("/restore", None);
        assert!(matches!(
            remap.remap("data/../../etc/passwd"),
            Err(Error::UnsafeEntryPath { .. })
        ));
    }

    #[test]
    fn test_without_root_keeps_full_member_path() {
        let remap = RootRemap::new("/restore", None);
        assert_eq!(
            remap.remap("/data/a.txt").unwrap(),
            PathBuf::from("/restore/data/a.txt")
        );
    }

    #[test]
    fn test_common_ancestor() {
        let paths = vec![
            PathBuf::from("home/u/docs"),
            PathBuf::from("home/u/docs/2024"),
            PathBuf::from("home/u/music"),
        ];
        assert_eq!(common_ancestor(paths), Some(PathBuf::from("home/u")));
        assert_eq!(
            common_ancestor(vec![PathBuf::from("a/b")]),
            Some(PathBuf::from("a/b"))
        );
        assert_eq!(
            common_ancestor(vec![PathBuf::from("a"), PathBuf::from("b")]),
            Some(PathBuf::new())
        );
        assert_eq!(common_ancestor(Vec::new()), None);
    }
}
