//! Bus stop code type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid stop code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop code {input:?}: {reason}")]
pub struct InvalidStopCode {
    input: String,
    reason: &'static str,
}

/// A valid 5-character bus stop code.
///
/// Stop codes are 5 ASCII alphanumeric characters (in practice digits,
/// e.g. `"01012"`). Leading zeros are significant, so the code is kept as
/// text rather than a number. Any `StopCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use bus_finder::domain::StopCode;
///
/// let code = StopCode::parse("01012").unwrap();
/// assert_eq!(code.as_str(), "01012");
///
/// // Wrong length is rejected
/// assert!(StopCode::parse("1012").is_err());
/// assert!(StopCode::parse("010120").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopCode([u8; 5]);

impl StopCode {
    /// Parse a stop code from a string.
    ///
    /// Surrounding whitespace is trimmed; the remainder must be exactly
    /// 5 ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidStopCode> {
        let trimmed = s.trim();
        let bytes = trimmed.as_bytes();

        if bytes.len() != 5 {
            return Err(InvalidStopCode {
                input: s.to_string(),
                reason: "must be exactly 5 characters",
            });
        }

        if !bytes.iter().all(u8::is_ascii_alphanumeric) {
            return Err(InvalidStopCode {
                input: s.to_string(),
                reason: "must be ASCII letters or digits",
            });
        }

        Ok(StopCode([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]]))
    }

    /// Returns the stop code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII alphanumerics are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl TryFrom<String> for StopCode {
    type Error = InvalidStopCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StopCode> for String {
    fn from(code: StopCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Debug for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopCode({})", self.as_str())
    }
}

impl fmt::Display for StopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
