//! Ordering of registry version strings
//!
//! Registry versions are mostly `MAJOR.MINOR.PATCH`, optionally prefixed
//! (`v1.2.3`). Anything that does not reduce to dot-separated integers is
//! not rejected: it maps to the sentinel key `0.0.0` so that it sorts below
//! every real release.

use std::cmp::Ordering;
use std::fmt;

/// Comparable form of a version string
#[derive(Debug, Clone)]
pub struct VersionKey {
    components: Vec<u64>,
}

impl VersionKey {
    /// The key malformed versions collapse to
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            components: vec![0, 0, 0],
        }
    }

    /// Parse a version string, falling back to [`VersionKey::sentinel`]
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::try_parse(input).unwrap_or_else(Self::sentinel)
    }

    /// Parse a version string; `None` when it is not dot-separated integers
    /// after its leading non-digit prefix
    #[must_use]
    pub fn try_parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let start = trimmed.find(|c: char| c.is_ascii_digit())?;
        let components = trimmed[start..]
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                part.parse::<u64>().ok()
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { components })
    }

    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

/// Compare two version strings
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    VersionKey::parse(a).cmp(&VersionKey::parse(b))
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let left = self.components.get(i).copied().unwrap_or(0);
            let right = other.components.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_not_lexicographic() {
        assert!(VersionKey::parse("2.10.0") > VersionKey::parse("2.9.0"));
        assert_eq!(compare("2.9.0", "2.10.0"), Ordering::Less);
    }

    #[test]
    fn prefix_is_stripped() {
        assert_eq!(VersionKey::parse("v1.2.3").components(), &[1, 2, 3]);
        assert_eq!(VersionKey::parse("release-4.0").components(), &[4, 0]);
    }

    #[test]
    fn shorter_is_zero_padded() {
        assert_eq!(VersionKey::parse("1.2"), VersionKey::parse("1.2.0"));
        assert!(VersionKey::parse("1.2") < VersionKey::parse("1.2.1"));
    }

    #[test]
    fn malformed_maps_to_sentinel() {
        for input in ["not-a-version", "", "1..2", "1.2.3-rc1", "1.+2", "1.2.x"] {
            assert!(VersionKey::try_parse(input).is_none(), "{input}");
            assert_eq!(VersionKey::parse(input), VersionKey::sentinel(), "{input}");
        }
        assert!(VersionKey::parse("not-a-version") < VersionKey::parse("0.0.1"));
    }

    #[test]
    fn display_joins_components() {
        assert_eq!(VersionKey::parse("v6.26.0").to_string(), "6.26.0");
    }
}
