//! Tag parsing and the inclusion/exclusion filter.
//!
//! Filter strings are comma and/or whitespace delimited lists of tags. Parsing
//! is permissive: empty tokens are dropped and nothing is ever rejected.
//! Comparison is exact and case-sensitive.

use std::collections::BTreeSet;

/// Canonical set of tags, parsed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma/whitespace delimited tag list.
    pub fn parse(tags: &str) -> Self {
        TagSet(
            tags.split(|c: char| c == ',' || c.is_whitespace())
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn intersects(&self, other: &TagSet) -> bool {
        // Iterate the smaller set.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.0.iter().any(|tag| large.0.contains(tag))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(", "))
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        TagSet(
            iter.into_iter()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// Decides whether a test with `tags` runs under the given include/exclude sets.
///
/// Exclusion wins over inclusion. An empty include set admits every test that
/// is not excluded.
pub fn should_run(tags: &TagSet, included: &TagSet, excluded: &TagSet) -> bool {
    if !excluded.is_empty() && tags.intersects(excluded) {
        return false;
    }
    if included.is_empty() {
        return true;
    }
    tags.intersects(included)
}

/// Parsed include/exclude pair for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub included: TagSet,
    pub excluded: TagSet,
}

impl TagFilter {
    pub fn parse(included: &str, excluded: &str) -> Self {
        Self {
            included: TagSet::parse(included),
            excluded: TagSet::parse(excluded),
        }
    }

    /// True when the filter admits every test.
    pub fn is_open(&self) -> bool {
        self.included.is_empty() && self.excluded.is_empty()
    }

    pub fn should_run(&self, tags: &TagSet) -> bool {
        should_run(tags, &self.included, &self.excluded)
    }
}

impl std::fmt::Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.included.is_empty(), self.excluded.is_empty()) {
            (true, true) => write!(f, "all tests"),
            (false, true) => write!(f, "included [{}]", self.included),
            (true, false) => write!(f, "excluded [{}]", self.excluded),
            (false, false) => write!(
                f,
                "included [{}], excluded [{}]",
                self.included, self.excluded
            ),
        }
    }
}
