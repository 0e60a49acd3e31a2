//! Account directory port.
//!
//! The directory is the external account service that knows which
//! organizations a principal administers. It is consulted once per
//! ordinary-user principal, during [`crate::principal::create_principal`].

use std::collections::HashMap;
use std::future::Future;

use crate::error::{Error, Result};

/// Source of "organizations where this principal holds administrator access".
///
/// Retry and timeout policy belong to the implementation.
pub trait AccountDirectory: Send + Sync {
    fn organizations_with_admin_access(
        &self,
        principal_id: i64,
    ) -> impl Future<Output = Result<Vec<i64>>> + Send;
}

/// In-memory directory keyed by principal id.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    admin_access: HashMap<i64, Vec<i64>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `principal_id` administers `organizations`.
    pub fn with(mut self, principal_id: i64, organizations: impl IntoIterator<Item = i64>) -> Self {
        self.admin_access
            .entry(principal_id)
            .or_default()
            .extend(organizations);
        self
    }
}

impl AccountDirectory for StaticDirectory {
    async fn organizations_with_admin_access(&self, principal_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .admin_access
            .get(&principal_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Directory that always fails, standing in for an unreachable account service.
#[derive(Debug, Clone, Default)]
pub struct UnavailableDirectory;

impl AccountDirectory for UnavailableDirectory {
    async fn organizations_with_admin_access(&self, principal_id: i64) -> Result<Vec<i64>> {
        Err(Error::Directory(format!(
            "account service unavailable for principal {principal_id}"
        )))
    }
}
