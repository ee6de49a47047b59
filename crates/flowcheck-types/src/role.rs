//! OpenFlow channel roles and cluster member ordinals.

use crate::ParseError;
use std::fmt;
use std::str::FromStr;

/// Role a controller holds on a switch's OpenFlow channel.
///
/// Parsing is case-insensitive and total: tokens outside the three
/// OpenFlow roles are preserved in [`MastershipRole::Other`] so a
/// misbehaving device still reports what it actually said.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MastershipRole {
    Master,
    Slave,
    Equal,
    Other(String),
}

impl MastershipRole {
    pub fn is_master(&self) -> bool {
        matches!(self, MastershipRole::Master)
    }
}

impl From<&str> for MastershipRole {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "master" => MastershipRole::Master,
            "slave" => MastershipRole::Slave,
            "equal" => MastershipRole::Equal,
            other => MastershipRole::Other(other.to_string()),
        }
    }
}

impl FromStr for MastershipRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MastershipRole::from(s))
    }
}

impl fmt::Display for MastershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MastershipRole::Master => write!(f, "master"),
            MastershipRole::Slave => write!(f, "slave"),
            MastershipRole::Equal => write!(f, "equal"),
            MastershipRole::Other(s) => write!(f, "{s}"),
        }
    }
}

/// 1-based ordinal of a controller inside its cluster.
///
/// Entity-owner strings carry it as `member-<N>`; the first `member-`
/// occurrence is taken wherever it sits in the string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberIndex(u32);

impl MemberIndex {
    pub const fn new(ordinal: u32) -> Self {
        MemberIndex(ordinal)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Zero-based position into a member-ordered list of `len` entries,
    /// or `None` when the ordinal falls outside `1..=len`.
    pub fn position(&self, len: usize) -> Option<usize> {
        let ordinal = self.0 as usize;
        if (1..=len).contains(&ordinal) {
            Some(ordinal - 1)
        } else {
            None
        }
    }
}

impl fmt::Display for MemberIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member-{}", self.0)
    }
}

impl FromStr for MemberIndex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const MARKER: &str = "member-";

        let lower = s.to_ascii_lowercase();
        let start = lower
            .find(MARKER)
            .ok_or_else(|| ParseError::InvalidMemberIndex(s.to_string()))?
            + MARKER.len();
        let digits: String = lower[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        digits
            .parse::<u32>()
            .map(MemberIndex)
            .map_err(|_| ParseError::InvalidMemberIndex(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_role_parse_case_insensitive() {
        assert_eq!(MastershipRole::from("MASTER"), MastershipRole::Master);
        assert_eq!(MastershipRole::from("Slave"), MastershipRole::Slave);
        assert_eq!(MastershipRole::from(" equal "), MastershipRole::Equal);
    }

    #[test]
    fn test_role_preserves_unknown_tokens() {
        let role = MastershipRole::from("Standby");
        assert_eq!(role, MastershipRole::Other("standby".to_string()));
        assert!(!role.is_master());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(MastershipRole::Master.to_string(), "master");
        assert_eq!(
            MastershipRole::Other("standby".to_string()).to_string(),
            "standby"
        );
    }

    #[test]
    fn test_member_index_parse() {
        let idx: MemberIndex = "member-2".parse().unwrap();
        assert_eq!(idx.as_u32(), 2);

        let quoted: MemberIndex = "Member-13 (voting)".parse().unwrap();
        assert_eq!(quoted.as_u32(), 13);
    }

    #[test]
    fn test_member_index_parse_invalid() {
        assert!("".parse::<MemberIndex>().is_err());
        assert!("leader".parse::<MemberIndex>().is_err());
        assert!("member-".parse::<MemberIndex>().is_err());
        assert!("member-x".parse::<MemberIndex>().is_err());
    }

    #[test]
    fn test_member_index_position() {
        let idx = MemberIndex::new(2);
        assert_eq!(idx.position(3), Some(1));
        assert_eq!(idx.position(1), None);
        assert_eq!(MemberIndex::new(0).position(3), None);
        assert_eq!(MemberIndex::new(4).position(3), None);
    }
}
