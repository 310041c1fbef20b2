use derive_more::{Add, AddAssign};

/// Files and folders handled by one top-level invocation.
///
/// Owned by the entry point and passed down the recursion by `&mut`, so two
/// invocations in the same process never share counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Add, AddAssign)]
pub struct TransferCounters {
    pub files: usize,
    pub folders: usize,
}

impl TransferCounters {
    pub fn file(&mut self) {
        self.files += 1;
    }

    pub fn folder(&mut self) {
        self.folders += 1;
    }

    pub fn total(&self) -> usize {
        self.files + self.folders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let mut counters = TransferCounters::default();
        counters.file();
        counters.file();
        counters.folder();
        assert_eq!(counters, TransferCounters { files: 2, folders: 1 });
        assert_eq!(counters.total(), 3);
    }

    #[test]
    fn test_counters_add() {
        let mut a = TransferCounters { files: 1, folders: 2 };
        a += TransferCounters { files: 3, folders: 0 };
        assert_eq!(a + TransferCounters::default(), TransferCounters { files: 4, folders: 2 });
    }
}
