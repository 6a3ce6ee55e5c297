//! Supported Java language versions and inclusive version ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One supported revision of the Java grammar.
///
/// Declaration order is the version order: `ALL` lists the variants in the
/// same order, and the derived `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JavaVersion {
    J1_3,
    J1_4,
    J1_5,
    J1_6,
    J1_7,
    J1_8,
    J9,
    J10,
    J11,
}

impl JavaVersion {
    /// The whole domain, oldest first.
    pub const ALL: [JavaVersion; 9] = [
        JavaVersion::J1_3,
        JavaVersion::J1_4,
        JavaVersion::J1_5,
        JavaVersion::J1_6,
        JavaVersion::J1_7,
        JavaVersion::J1_8,
        JavaVersion::J9,
        JavaVersion::J10,
        JavaVersion::J11,
    ];

    pub const LATEST: JavaVersion = JavaVersion::J11;

    /// Position in `ALL`.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Display name, e.g. `1.4` or `10`.
    pub fn name(self) -> &'static str {
        match self {
            JavaVersion::J1_3 => "1.3",
            JavaVersion::J1_4 => "1.4",
            JavaVersion::J1_5 => "1.5",
            JavaVersion::J1_6 => "1.6",
            JavaVersion::J1_7 => "1.7",
            JavaVersion::J1_8 => "1.8",
            JavaVersion::J9 => "9",
            JavaVersion::J10 => "10",
            JavaVersion::J11 => "11",
        }
    }

    pub fn from_name(name: &str) -> Option<JavaVersion> {
        JavaVersion::ALL.into_iter().find(|v| v.name() == name)
    }

    /// Inclusive range `self..=last` in domain order. See [`range`].
    pub fn to(self, last: JavaVersion) -> Vec<JavaVersion> {
        range(self, last)
    }

    /// Every version from `self` up to [`JavaVersion::LATEST`].
    pub fn and_later(self) -> Vec<JavaVersion> {
        range(self, JavaVersion::LATEST)
    }
}

/// All versions between `a` and `b`, both included.
///
/// The result is always in ascending domain order, whichever endpoint comes
/// first: `range(J9, J1_7)` is `[J1_7, J1_8, J9]`, not the reverse.
pub fn range(a: JavaVersion, b: JavaVersion) -> Vec<JavaVersion> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    JavaVersion::ALL[lo.ordinal()..=hi.ordinal()].to_vec()
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown Java version '{0}'")]
pub struct UnknownVersion(pub String);

impl FromStr for JavaVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        JavaVersion::from_name(trimmed)
            .or_else(|| {
                // long `1.x` spelling of 9 and later
                trimmed
                    .strip_prefix("1.")
                    .and_then(JavaVersion::from_name)
                    .filter(|v| *v >= JavaVersion::J9)
            })
            .ok_or_else(|| UnknownVersion(s.to_string()))
    }
}

impl TryFrom<String> for JavaVersion {
    type Error = UnknownVersion;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JavaVersion> for String {
    fn from(v: JavaVersion) -> String {
        v.name().to_string()
    }
}
