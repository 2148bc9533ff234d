//! Platform users and their roles.

use std::str::FromStr;

use common::UserId;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Actor roles supplied by the identity layer.
///
/// Only `Admin` is elevated: allowed to list every order/ticket and to
/// change their status. `Owner` marks an approved facility owner and grants
/// no elevated access here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    Owner,
}

impl Role {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Returns true if this role may operate on other users' records.
    #[must_use]
    pub const fn is_elevated(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "owner" => Ok(Self::Owner),
            _ => Err(StoreError::Decode {
                what: "role",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A platform user as resolved by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

/// A user not yet persisted; storage assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub role: Role,
}
