//! OpenFlow flow cookie.

use crate::ParseError;
use std::fmt;
use std::str::FromStr;

/// Opaque 64-bit tag a controller stamps on the flows it programs.
///
/// Inventory documents carry cookies as decimal JSON numbers; device
/// CLI output prints them in hex. [`FromStr`] takes the hex form, with
/// or without a `0x` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cookie(u64);

impl Cookie {
    /// Creates a cookie from its raw value.
    pub const fn new(raw: u64) -> Self {
        Cookie(raw)
    }

    /// Returns the raw 64-bit value.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for Cookie {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        u64::from_str_radix(hex, 16)
            .map(Cookie)
            .map_err(|_| ParseError::InvalidCookie(s.to_string()))
    }
}

impl From<u64> for Cookie {
    fn from(raw: u64) -> Self {
        Cookie(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_hex() {
        let cookie: Cookie = "0xbef00d".parse().unwrap();
        assert_eq!(cookie.as_u64(), 0xbef00d);

        let bare: Cookie = "14".parse().unwrap();
        assert_eq!(bare.as_u64(), 0x14);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Cookie>().is_err());
        assert!("0xzz".parse::<Cookie>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Cookie::new(0x2b00).to_string(), "0x2b00");
    }
}
