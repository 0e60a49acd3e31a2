use crate::claims::ScopeSet;
use crate::error::Result;
use crate::permission::{Permission, ResourceStatus};
use crate::query::{DocumentQuery, Fragment};
use crate::store::Store;

use super::{Accessor, StandardAccessor};

/// End-user access: only live, published documents are visible at all.
///
/// Behind the gate, resolution is delegated to a [`StandardAccessor`] over
/// the end-user grant relations. A document that is missing, archived or
/// unpublished resolves to [`Permission::None`] rather than
/// [`crate::Error::NotFound`], so an end-user cannot tell it apart from one
/// they simply have no grant on.
#[derive(Debug, Clone)]
pub struct EndUserAccessor {
    inner: StandardAccessor,
}

impl EndUserAccessor {
    pub fn new(end_user_id: i64, group_id: i64, scopes: ScopeSet) -> Self {
        Self {
            inner: StandardAccessor::for_end_user(end_user_id, group_id, scopes),
        }
    }

    pub fn inner(&self) -> &StandardAccessor {
        &self.inner
    }
}

impl Accessor for EndUserAccessor {
    fn query(&self) -> DocumentQuery {
        self.inner.query().gate(Fragment::new(
            "d.deleted_at IS NULL AND d.published_revision_id IS NOT NULL",
        ))
    }

    /// `status` is ignored: end-users only ever see existing documents.
    async fn permission_of(
        &self,
        store: &Store,
        id: i64,
        _status: ResourceStatus,
    ) -> Result<Permission> {
        match store.document(id, ResourceStatus::Exists).await? {
            Some(document) if document.is_published() => self.inner.resolve(store, &document).await,
            _ => Ok(Permission::None),
        }
    }
}
