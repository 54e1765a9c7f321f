//! Principal roles and account statuses
//!
//! Both sets are closed: authorization decisions and route dispatch match
//! exhaustively on these enums instead of comparing strings.
//!
//! # Design Principles
//!
//! 1. **Closed sets**: adding a role is a compile-time event, not a typo hazard
//! 2. **One wire spelling**: serde, `FromStr` and `Display` agree on the
//!    snake_case form stored in the database and sent over the API

use serde::{Deserialize, Serialize};
use std::fmt;

/// Principal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Wire/database spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Prefix used when generating the human-readable principal code
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Role::Student => "STU",
            Role::Teacher => "TCH",
            Role::Admin | Role::SuperAdmin => "ADM",
        }
    }

    /// Roles accepted as a login `userType`
    ///
    /// Super admins sign in through the admin type; `super_admin` itself is
    /// not a valid login selector.
    pub fn is_login_type(&self) -> bool {
        matches!(self, Role::Student | Role::Teacher | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown role string
#[derive(Debug, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = ParseRoleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Account status
///
/// `Graduated` applies to students only; staff accounts move between
/// `Active`, `Inactive` and `Suspended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Active,
    Inactive,
    Suspended,
    Graduated,
}

impl Status {
    /// Wire/database spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Inactive => "inactive",
            Status::Suspended => "suspended",
            Status::Graduated => "graduated",
        }
    }

    /// Whether this status is part of the given role's status set
    pub fn valid_for(&self, role: Role) -> bool {
        match self {
            Status::Graduated => role == Role::Student,
            _ => true,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown status string
#[derive(Debug, thiserror::Error)]
#[error("Unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            "suspended" => Ok(Status::Suspended),
            "graduated" => Ok(Status::Graduated),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = ParseStatusError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
