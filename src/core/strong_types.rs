// Strong Types - newtypes for identifiers that cross the storage and HTTP boundaries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest integer a JavaScript client can represent exactly (2^53 - 1).
pub const MAX_SAFE_ID: i64 = (1 << 53) - 1;

/// Strongly-typed preserve identifier - prevents confusion with other numeric types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreserveId(pub i64);

impl PreserveId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Valid ids are positive and representable without loss in a browser
    pub fn is_valid(self) -> bool {
        self.0 > 0 && self.0 <= MAX_SAFE_ID
    }
}

impl fmt::Display for PreserveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PreserveId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<PreserveId> for i64 {
    fn from(id: PreserveId) -> Self {
        id.0
    }
}

impl FromStr for PreserveId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a valid preserve id", s))?;
        let id = Self(raw);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(format!("'{}' is not a valid preserve id", s))
        }
    }
}
