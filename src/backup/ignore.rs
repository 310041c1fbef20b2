//! Substring based exclusion of filesystem paths.
//!
//! A path is excluded when any configured pattern occurs anywhere in its
//! string form. Matching is case-sensitive and has no glob semantics, so a
//! pattern naming a folder also excludes everything below that folder.

use derive_more::Deref;
use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt::Formatter;
use std::path::Path;
use std::result;
use std::str::FromStr;

/// Ordered set of trimmed, non-empty ignore substrings.
///
/// Deserializes from either a comma separated string (`".db, .thumb"`) or a
/// list of strings. Blank patterns are dropped on construction, an empty
/// pattern would otherwise match every path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deref)]
#[serde(transparent)]
pub struct IgnorePatterns {
    patterns: Vec<String>,
}

impl IgnorePatterns {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn from_comma_separated<S: AsRef<str>>(value: S) -> Self {
        Self::new(value.as_ref().split(','))
    }

    pub fn is_excluded<P: AsRef<Path>>(&self, path: P) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let path = path.as_ref().to_string_lossy();
        let matched = self.patterns.iter().find(|p| path.contains(p.as_str()));
        if let Some(pattern) = matched {
            tracing::trace!("Ignoring {:?}, matched pattern {:?}", path, pattern);
        }
        matched.is_some()
    }
}

impl FromStr for IgnorePatterns {
    type Err = Infallible;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        Ok(Self::from_comma_separated(s))
    }
}

struct IgnorePatternsVisitor;

impl<'de> Visitor<'de> for IgnorePatternsVisitor {
    type Value = IgnorePatterns;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a comma separated string or a list of strings")
    }

    fn visit_str<E>(self, v: &str) -> result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(IgnorePatterns::from_comma_separated(v))
    }

    fn visit_unit<E>(self) -> result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(IgnorePatterns::default())
    }

    fn visit_seq<A>(self, mut seq: A) -> result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut patterns = Vec::new();
        while let Some(p) = seq.next_element::<String>()? {
            patterns.push(p);
        }
        Ok(IgnorePatterns::new(patterns))
    }
}

impl<'de> Deserialize<'de> for IgnorePatterns {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> result::Result<Self, D::Error> {
        deserializer.deserialize_any(IgnorePatternsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_extension_anywhere_in_path() {
        let ignore = IgnorePatterns::new([".db"]);
        assert!(ignore.is_excluded("/src/sub/ignore.db"));
        assert!(ignore.is_excluded("/src/cache.db/inner.txt"));
        assert!(!ignore.is_excluded("/src/sub/b.txt"));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let ignore = IgnorePatterns::new(["Thumbs"]);
        assert!(ignore.is_excluded("/pics/Thumbs.db"));
        assert!(!ignore.is_excluded("/pics/thumbs.db"));
    }

    #[test]
    fn test_empty_pattern_excludes_nothing() {
        let ignore = IgnorePatterns::new([""]);
        assert!(ignore.is_empty());
        assert!(!ignore.is_excluded("/any/path.txt"));

        let ignore = IgnorePatterns::from_comma_separated("");
        assert!(!ignore.is_excluded("/any/path.txt"));
    }

    #[test]
    fn test_comma_separated_trims_and_drops_blanks() {
        let ignore = IgnorePatterns::from_comma_separated(" .thumb, .db ,, node_modules ");
        assert_eq!(
            ignore.as_slice(),
            &[".thumb".to_string(), ".db".to_string(), "node_modules".to_string()]
        );
    }

    #[test]
    fn test_deserialize_from_string_and_list() {
        let from_str: IgnorePatterns = serde_json::from_str("\".db, .tmp\"").unwrap();
        let from_list: IgnorePatterns = serde_json::from_str("[\".db\", \" .tmp \", \"\"]").unwrap();
        assert_eq!(from_str, from_list);
        assert_eq!(from_str.len(), 2);
    }

    #[test]
    fn test_deserialize_rejects_numbers() {
        assert!(serde_json::from_str::<IgnorePatterns>("42").is_err());
    }

    #[test]
    fn test_from_str() {
        let ignore: IgnorePatterns = ".git,target".parse().unwrap();
        assert!(ignore.is_excluded("/repo/.git/HEAD"));
        assert!(ignore.is_excluded("/repo/target/debug"));
    }
}
