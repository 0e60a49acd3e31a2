//! Permission resolution strategies.
//!
//! An [`Accessor`] answers batch and point permission queries for one
//! principal. Three variants exist and one is bound to each principal when it
//! is constructed:
//!
//! - [`AbsoluteAccessor`]: administrators, `Manage` on everything that exists
//! - [`StandardAccessor`]: explicit grants overlaid with implicit rules
//! - [`EndUserAccessor`]: a standard accessor behind a publication gate
//!
//! Accessors hold no connection. The [`Store`] is passed to each operation so
//! an accessor can be reused for the principal's lifetime.

mod absolute;
mod end_user;
mod standard;

use std::future::Future;

pub use absolute::AbsoluteAccessor;
pub use end_user::EndUserAccessor;
pub use standard::{Grantee, StandardAccessor};

use crate::error::{Error, Result};
use crate::permission::{Permission, ResourceStatus};
use crate::query::DocumentQuery;
use crate::store::Store;

/// Batch and point permission queries for one principal.
pub trait Accessor: Send + Sync {
    /// Every document visible with a permission above `None`, unevaluated.
    fn query(&self) -> DocumentQuery;

    /// Resolve the permission on one document.
    ///
    /// Fails with [`Error::NotFound`] if no document with `id` exists under
    /// `status`. The end-user accessor never fails this way.
    fn permission_of(
        &self,
        store: &Store,
        id: i64,
        status: ResourceStatus,
    ) -> impl Future<Output = Result<Permission>> + Send;

    /// Whether the permission on one document reaches `required`.
    ///
    /// Asking for [`Permission::None`] is rejected with
    /// [`Error::InvalidArgument`] before any lookup.
    fn has_permission(
        &self,
        store: &Store,
        id: i64,
        required: Permission,
        status: ResourceStatus,
    ) -> impl Future<Output = Result<bool>> + Send {
        async move {
            if required == Permission::None {
                return Err(Error::InvalidArgument(
                    "required permission must be above None".to_string(),
                ));
            }
            Ok(self.permission_of(store, id, status).await? >= required)
        }
    }
}

/// The accessor variant bound to a principal.
#[derive(Debug, Clone)]
pub enum BoundAccessor {
    Absolute(AbsoluteAccessor),
    Standard(StandardAccessor),
    EndUser(EndUserAccessor),
}

impl Accessor for BoundAccessor {
    fn query(&self) -> DocumentQuery {
        match self {
            BoundAccessor::Absolute(accessor) => accessor.query(),
            BoundAccessor::Standard(accessor) => accessor.query(),
            BoundAccessor::EndUser(accessor) => accessor.query(),
        }
    }

    async fn permission_of(
        &self,
        store: &Store,
        id: i64,
        status: ResourceStatus,
    ) -> Result<Permission> {
        match self {
            BoundAccessor::Absolute(accessor) => accessor.permission_of(store, id, status).await,
            BoundAccessor::Standard(accessor) => accessor.permission_of(store, id, status).await,
            BoundAccessor::EndUser(accessor) => accessor.permission_of(store, id, status).await,
        }
    }
}

impl From<AbsoluteAccessor> for BoundAccessor {
    fn from(accessor: AbsoluteAccessor) -> Self {
        BoundAccessor::Absolute(accessor)
    }
}

impl From<StandardAccessor> for BoundAccessor {
    fn from(accessor: StandardAccessor) -> Self {
        BoundAccessor::Standard(accessor)
    }
}

impl From<EndUserAccessor> for BoundAccessor {
    fn from(accessor: EndUserAccessor) -> Self {
        BoundAccessor::EndUser(accessor)
    }
}

pub(crate) fn not_found(id: i64, status: ResourceStatus) -> Error {
    Error::NotFound(format!("document {id} ({status:?})"))
}
