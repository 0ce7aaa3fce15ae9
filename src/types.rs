/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named permissions checked against the caller before an entity operation runs.
/// Each route declares exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entitlement {
    Create,
    Read,
    Update,
    Delete,
}

impl Entitlement {
    pub const ALL: [Entitlement; 4] = [
        Entitlement::Create,
        Entitlement::Read,
        Entitlement::Update,
        Entitlement::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entitlement::Create => "Create",
            Entitlement::Read => "Read",
            Entitlement::Update => "Update",
            Entitlement::Delete => "Delete",
        }
    }
}

impl fmt::Display for Entitlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Entitlement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entitlement::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown entitlement: {}", s))
    }
}
