use crate::error::Result;
use crate::permission::{Permission, ResourceStatus};
use crate::query::{DocumentQuery, Fragment};
use crate::store::Store;

use super::{Accessor, not_found};

/// Administrator access: `Manage` on every document that exists under the
/// requested status. Grants are never consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteAccessor;

impl Accessor for AbsoluteAccessor {
    fn query(&self) -> DocumentQuery {
        DocumentQuery::new(Fragment::new(Permission::Manage.ordinal().to_string()))
    }

    async fn permission_of(
        &self,
        store: &Store,
        id: i64,
        status: ResourceStatus,
    ) -> Result<Permission> {
        if !store.exists(id, status).await? {
            return Err(not_found(id, status));
        }
        Ok(Permission::Manage)
    }
}
