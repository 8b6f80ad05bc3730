//! Dashboard roles

use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role tier of a dashboard user.
///
/// Employees only use the mobile app and never hold a dashboard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Branch-scoped administrator
    Admin,
    /// Global administrator across all branches
    Superadmin,
}

impl Role {
    pub const ALL: [Self; 2] = [Self::Admin, Self::Superadmin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    /// Landing page for this role
    pub const fn home_path(self) -> &'static str {
        match self {
            Self::Admin => "/",
            Self::Superadmin => "/superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            other => Err(SessionError::UnknownRole(other.to_string())),
        }
    }
}
