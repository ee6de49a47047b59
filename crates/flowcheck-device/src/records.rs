//! Neutral records for switch-reported state.

use flowcheck_types::Cookie;

/// One flow entry as the switch reports it.
///
/// `id` is the switch-local entry number and means nothing to the
/// controller; correlation happens through the cookie. Fields the
/// switch did not print stay unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveFlow {
    pub id: String,
    pub table: Option<u8>,
    pub cookie: Option<Cookie>,
    pub packets: Option<u64>,
    pub bytes: Option<u64>,
}

impl LiveFlow {
    pub(crate) fn new(id: impl Into<String>, table: Option<u8>) -> Self {
        LiveFlow {
            id: id.into(),
            table,
            cookie: None,
            packets: None,
            bytes: None,
        }
    }
}

/// One group entry as the switch reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveGroup {
    pub id: u32,
    pub packets: Option<u64>,
    pub bytes: Option<u64>,
}

impl LiveGroup {
    pub(crate) fn new(id: u32) -> Self {
        LiveGroup {
            id,
            packets: None,
            bytes: None,
        }
    }
}
