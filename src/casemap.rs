//! IRC case-mapping functions.
//!
//! IRC servers advertise how nicknames and channel names fold case through
//! the `CASEMAPPING` ISUPPORT token. Each scheme is a plain per-character
//! shift over an ASCII range; nothing outside that range is touched.
//!
//! | scheme           | upper range      | lower range      |
//! |------------------|------------------|------------------|
//! | `ascii`          | `A`..=`Z` (65-90)  | `a`..=`z` (97-122) |
//! | `strict-rfc1459` | `A`..=`]` (65-93)  | `a`..=`}` (97-125) |
//! | `rfc1459`        | `A`..=`^` (65-94)  | `a`..=`~` (97-126) |

/// A case-folding scheme selected by the server's `CASEMAPPING` token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseMapping {
    /// `ascii`: only the 26 letters fold.
    Ascii,
    /// `strict-rfc1459`: letters plus `[]\` fold to `{}|`.
    StrictRfc1459,
    /// `rfc1459`: letters plus `[]\^` fold to `{}|~`.
    #[default]
    Rfc1459,
}

impl CaseMapping {
    /// Select the scheme for an advertised `CASEMAPPING` value.
    ///
    /// Missing or unrecognized values fall back to [`CaseMapping::Rfc1459`].
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("ascii") => Self::Ascii,
            Some("strict-rfc1459") => Self::StrictRfc1459,
            _ => Self::Rfc1459,
        }
    }

    /// The token value this scheme is advertised as.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::StrictRfc1459 => "strict-rfc1459",
            Self::Rfc1459 => "rfc1459",
        }
    }

    fn upper_end(self) -> u32 {
        match self {
            Self::Ascii => 'Z' as u32,
            Self::StrictRfc1459 => ']' as u32,
            Self::Rfc1459 => '^' as u32,
        }
    }

    /// Lowercase a single character.
    #[inline]
    pub fn lower_char(self, c: char) -> char {
        let code = c as u32;
        if (65..=self.upper_end()).contains(&code) {
            char::from_u32(code + 32).unwrap_or(c)
        } else {
            c
        }
    }

    /// Uppercase a single character.
    #[inline]
    pub fn upper_char(self, c: char) -> char {
        let code = c as u32;
        if (97..=self.upper_end() + 32).contains(&code) {
            char::from_u32(code - 32).unwrap_or(c)
        } else {
            c
        }
    }

    /// Lowercase a string under this scheme.
    pub fn to_lower(self, s: &str) -> String {
        s.chars().map(|c| self.lower_char(c)).collect()
    }

    /// Uppercase a string under this scheme.
    pub fn to_upper(self, s: &str) -> String {
        s.chars().map(|c| self.upper_char(c)).collect()
    }

    /// Canonical key for storing or comparing a name. Same as [`to_lower`](Self::to_lower).
    pub fn normalize(self, s: &str) -> String {
        self.to_lower(s)
    }

    /// Compare two names case-insensitively under this scheme.
    pub fn eq(self, a: &str, b: &str) -> bool {
        if a.len() != b.len() {
            return false;
        }

        a.chars()
            .zip(b.chars())
            .all(|(ca, cb)| self.lower_char(ca) == self.lower_char(cb))
    }
}

impl std::fmt::Display for CaseMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
