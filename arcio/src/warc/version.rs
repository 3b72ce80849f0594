use std::fmt;

/// The version of a WARC record.
///
/// Versions 1.0 and 1.1 are well-known, corresponding to ISO 28500 and
/// ISO 28500:2017 respectively, and can be referred to with the associated
/// constants [`WARC1_0`](Self::WARC1_0) and [`WARC1_1`](Self::WARC1_1).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Version {
    /// The integer part of the version number.
    pub major: u32,
    /// The fractional part of the version number.
    pub minor: u32,
}

impl Version {
    /// WARC 1.0, as specified by ISO 28500:2009.
    pub const WARC1_0: Self = Version { major: 1, minor: 0 };
    /// WARC 1.1, as specified by ISO 28500:2017.
    pub const WARC1_1: Self = Version { major: 1, minor: 1 };
}

/// Writes the version line form, e.g. `WARC/1.1`.
impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "WARC/{}.{}", self.major, self.minor)
    }
}

impl From<(u32, u32)> for Version {
    fn from((major, minor): (u32, u32)) -> Self {
        Version { major, minor }
    }
}
