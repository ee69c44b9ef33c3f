use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// Fixed namespace so that name-derived ids are stable across restarts.
const USER_NAMESPACE: Uuid = Uuid::from_u128(0x5f3c_9a1e_7b2d_4c8f_a6e0_1d94_b7c3_2e18);

/// Stable identity of a user, independent of any connection or session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(Uuid);

impl UserId {
    pub fn random() -> Self {
        UserId(Uuid::new_v4())
    }

    /// Derives the id for a user name. Names are compared case-insensitively.
    pub fn from_name(name: &str) -> Self {
        UserId(Uuid::new_v5(&USER_NAMESPACE, name.to_lowercase().as_bytes()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(UserId)
    }
}
