//! Three-part version parsing and sequencing
//!
//! Parsing is tolerant: missing or unparsable components read as zero, so any
//! input produces a valid `major.minor.patch` triple.

use shipwright_config::VersionMode;
use std::fmt;

/// Version used when the settings store holds nothing
pub const DEFAULT_VERSION: &str = "0.0.0";

/// A `major.minor.patch` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string; never fails
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::default();
        }

        let parts: Vec<&str> = text.split('.').collect();
        Self {
            major: parse_component(parts.first()),
            minor: parse_component(parts.get(1)),
            patch: parse_component(parts.get(2)),
        }
    }

    /// Next version for the given mode
    pub fn next(self, mode: VersionMode) -> Self {
        match mode {
            VersionMode::None => self,
            VersionMode::Patch => Self {
                patch: self.patch.saturating_add(1),
                ..self
            },
            VersionMode::Minor => Self {
                minor: self.minor.saturating_add(1),
                patch: 0,
                ..self
            },
            VersionMode::Major => Self::new(self.major.saturating_add(1), 0, 0),
        }
    }

    /// Numeric build code for stores that need one (at least 1)
    pub fn build_code(&self) -> u64 {
        let code = u64::from(self.major) * 10_000
            + u64::from(self.minor) * 100
            + u64::from(self.patch);
        code.max(1)
    }
}

/// Parse one component; negatives clamp to zero, garbage reads as zero
fn parse_component(part: Option<&&str>) -> u32 {
    let Some(part) = part else {
        return 0;
    };
    match part.trim().parse::<i64>() {
        Ok(value) => value.clamp(0, i64::from(u32::MAX)) as u32,
        Err(_) => 0,
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Canonical form of a version string
pub fn normalize(text: &str) -> String {
    Version::parse(text).to_string()
}

/// Next version string for `text` in `mode`
pub fn next_version(text: &str, mode: VersionMode) -> String {
    Version::parse(text).next(mode).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", Version::new(1, 2, 3))]
    #[case("", Version::new(0, 0, 0))]
    #[case("abc", Version::new(0, 0, 0))]
    #[case("1.x", Version::new(1, 0, 0))]
    #[case("1.2.3.4", Version::new(1, 2, 3))]
    #[case("-4.2.1", Version::new(0, 2, 1))]
    #[case("1.2.3-beta", Version::new(1, 2, 0))]
    #[case(" 7 . 8 . 9 ", Version::new(7, 8, 9))]
    fn test_parse(#[case] input: &str, #[case] expected: Version) {
        assert_eq!(Version::parse(input), expected);
    }

    #[rstest]
    #[case(VersionMode::None, "1.2.3")]
    #[case(VersionMode::Patch, "1.2.4")]
    #[case(VersionMode::Minor, "1.3.0")]
    #[case(VersionMode::Major, "2.0.0")]
    fn test_next(#[case] mode: VersionMode, #[case] expected: &str) {
        assert_eq!(next_version("1.2.3", mode), expected);
    }

    #[test]
    fn test_normalize_malformed() {
        assert_eq!(normalize("1.x"), "1.0.0");
        assert_eq!(normalize(""), "0.0.0");
    }

    #[test]
    fn test_build_code() {
        assert_eq!(Version::new(1, 2, 3).build_code(), 10_203);
        assert_eq!(Version::new(0, 0, 0).build_code(), 1);
    }

    fn any_mode() -> impl Strategy<Value = VersionMode> {
        prop_oneof![
            Just(VersionMode::None),
            Just(VersionMode::Patch),
            Just(VersionMode::Minor),
            Just(VersionMode::Major),
        ]
    }

    proptest! {
        #[test]
        fn prop_next_never_decreases(
            major in 0u32..100_000,
            minor in 0u32..100_000,
            patch in 0u32..100_000,
            mode in any_mode(),
        ) {
            let before = Version::new(major, minor, patch);
            let after = before.next(mode);
            prop_assert!(after >= before);
            match mode {
                VersionMode::None => prop_assert_eq!(after, before),
                VersionMode::Patch => {
                    prop_assert_eq!(after.major, major);
                    prop_assert_eq!(after.minor, minor);
                }
                VersionMode::Minor => prop_assert_eq!(after.patch, 0),
                VersionMode::Major => {
                    prop_assert_eq!(after.minor, 0);
                    prop_assert_eq!(after.patch, 0);
                }
            }
        }

        #[test]
        fn prop_parse_any_text_is_canonical(text in ".*") {
            let formatted = normalize(&text);
            prop_assert_eq!(normalize(&formatted), formatted.clone());
            prop_assert_eq!(formatted.split('.').count(), 3);
        }
    }
}
