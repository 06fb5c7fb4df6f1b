//! Class-file version table, with `Ord`/`PartialOrd` comparison and a
//! named-version lookup (`JAVA1_0_2`, `JAVA5`, ...) for readability at call
//! sites.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// A JVM class-file version as `major.minor`, strictly ordered by major then
/// minor version.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct ClassFileVersion {
    pub major: u16,
    pub minor: u16,
}

impl ClassFileVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        ClassFileVersion { major, minor }
    }

    pub const JAVA1_0_2: Self = Self::new(45, 3);
    pub const JAVA1_1: Self = Self::new(45, 3);
    pub const JAVA1_2: Self = Self::new(46, 0);
    pub const JAVA1_3: Self = Self::new(47, 0);
    pub const JAVA1_4: Self = Self::new(48, 0);
    pub const JAVA5: Self = Self::new(49, 0);
    pub const JAVA6: Self = Self::new(50, 0);
    pub const JAVA7: Self = Self::new(51, 0);
    pub const JAVA8: Self = Self::new(52, 0);
    pub const JAVA9: Self = Self::new(53, 0);

    /// Every version this crate recognizes, oldest first.
    pub const ALL: &'static [ClassFileVersion] = &[
        Self::JAVA1_0_2,
        Self::JAVA1_2,
        Self::JAVA1_3,
        Self::JAVA1_4,
        Self::JAVA5,
        Self::JAVA6,
        Self::JAVA7,
        Self::JAVA8,
        Self::JAVA9,
    ];

    /// Maps a raw `(major, minor)` pair read from a class file to the
    /// nearest supported version, as step 2 requires: "Record
    /// this version; downstream parsing consults it." We keep the exact
    /// major/minor read rather than snapping to a table entry, since
    /// attribute/flag-rule support checks only ever compare ordering.
    pub fn from_raw(major: u16, minor: u16) -> Self {
        ClassFileVersion { major, minor }
    }

    pub fn is_at_least(&self, other: ClassFileVersion) -> bool {
        *self >= other
    }
}

impl PartialOrd for ClassFileVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassFileVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => self.minor.cmp(&other.minor),
            ordering => ordering,
        }
    }
}

impl Display for ClassFileVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Anything with a first (and optionally last) supported class-file
/// version. Shared by constant-pool tags, attribute kinds, and flag-rule
/// collections.
pub trait Versioned {
    fn first_version_supporting(&self) -> ClassFileVersion;
    fn last_version_supporting(&self) -> Option<ClassFileVersion> {
        None
    }

    fn supports(&self, version: ClassFileVersion) -> bool {
        version >= self.first_version_supporting()
            && self
                .last_version_supporting()
                .map_or(true, |last| version <= last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_strictly_ordered_by_major() {
        let mut sorted = ClassFileVersion::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, ClassFileVersion::ALL);
    }

    #[test]
    fn minor_is_zero_after_java1_1() {
        for v in &ClassFileVersion::ALL[1..] {
            assert_eq!(v.minor, 0);
        }
    }

    #[test]
    fn ordering_is_transitive_across_major_and_minor() {
        assert!(ClassFileVersion::JAVA1_0_2 < ClassFileVersion::JAVA1_2);
        assert!(ClassFileVersion::JAVA8 < ClassFileVersion::JAVA9);
        assert!(ClassFileVersion::new(45, 3) < ClassFileVersion::new(45, 4));
    }
}
