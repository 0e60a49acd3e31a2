//! Permission levels and resource status.
//!
//! Permissions are totally ordered (`None < View < Manage`) and only ever
//! combine upwards: two sources for the same document resolve to the higher
//! of the two, never to their intersection.
//!
//! # Example
//!
//! ```
//! use docaccess::permission::{Permission, combine};
//!
//! assert_eq!(combine(Permission::View, Permission::Manage), Permission::Manage);
//! assert!(Permission::View >= Permission::View);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Access level a principal holds on a document.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Permission {
    /// No access.
    #[default]
    None,
    /// Read-only access.
    View,
    /// Full access.
    Manage,
}

impl Permission {
    /// Ordinal stored in the grant tables.
    /// Higher ordinal = more permissive.
    pub const fn ordinal(self) -> i64 {
        match self {
            Permission::None => 0,
            Permission::View => 1,
            Permission::Manage => 2,
        }
    }

    /// Decode a stored ordinal.
    pub fn from_ordinal(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Permission::None),
            1 => Ok(Permission::View),
            2 => Ok(Permission::Manage),
            other => Err(Error::Corrupt(format!("unknown permission level {other}"))),
        }
    }
}

/// Combine two permission sources. Always the maximum.
pub fn combine(a: Permission, b: Permission) -> Permission {
    a.max(b)
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::None => "none",
            Permission::View => "view",
            Permission::Manage => "manage",
        };
        f.write_str(name)
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Permission::None),
            "view" => Ok(Permission::View),
            "manage" => Ok(Permission::Manage),
            other => Err(Error::InvalidArgument(format!("unknown permission '{other}'"))),
        }
    }
}

/// Which subset of documents a lookup considers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceStatus {
    /// Not soft-deleted.
    #[default]
    Exists,
    /// Soft-deleted.
    Archived,
}

impl ResourceStatus {
    /// SQL predicate selecting documents in this status.
    pub(crate) fn predicate(self, alias: &str) -> String {
        match self {
            ResourceStatus::Exists => format!("{alias}.deleted_at IS NULL"),
            ResourceStatus::Archived => format!("{alias}.deleted_at IS NOT NULL"),
        }
    }
}

impl FromStr for ResourceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exists" => Ok(ResourceStatus::Exists),
            "archived" => Ok(ResourceStatus::Archived),
            other => Err(Error::InvalidArgument(format!("unknown status '{other}'"))),
        }
    }
}
