//! Docaccess - permission resolution for documents with layered grants.
//!
//! Every document carries explicit grants to users, organizations, end-users
//! and end-user groups. On top of those, implicit rules driven by role and
//! scope claims can raise a principal's access. This crate decides which
//! level applies:
//!
//! - **Permission**: `None < View < Manage`, combined by maximum
//! - **Claims**: verified principal claims and the recognised role/scope names
//! - **Store**: read-only views over documents and the four grant relations
//! - **Query**: deferred, filterable batch queries
//! - **Accessor**: absolute, standard and end-user resolution strategies
//! - **Principal**: principal construction from claims
//!
//! # Example
//!
//! ```ignore
//! use docaccess::{Accessor, Claims, Permission, ResourceStatus, StaticDirectory, Store};
//!
//! #[tokio::main]
//! async fn main() -> docaccess::Result<()> {
//!     let db = docaccess::db::connect("data.db").await?;
//!     let store = Store::new(docaccess::db::connection(&db)?);
//!
//!     let claims: Claims = serde_json::from_str(r#"{"sub": 7, "organization_id": 1}"#)?;
//!     let principal = docaccess::create_principal(&claims, &StaticDirectory::new()).await?;
//!
//!     let visible = principal
//!         .accessor()
//!         .query()
//!         .with_status(ResourceStatus::Exists)
//!         .collect(&store)
//!         .await?;
//!     let can_edit = principal
//!         .accessor()
//!         .has_permission(&store, 42, Permission::Manage, ResourceStatus::Exists)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod accessor;
pub mod claims;
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod permission;
pub mod principal;
pub mod query;
pub mod store;

// Re-export main types at crate root
pub use accessor::{AbsoluteAccessor, Accessor, BoundAccessor, EndUserAccessor, StandardAccessor};
pub use claims::{Claims, Role, Scope, ScopeSet};
pub use config::{Config, Loader};
pub use directory::{AccountDirectory, StaticDirectory};
pub use error::{Error, Result};
pub use permission::{Permission, ResourceStatus, combine};
pub use principal::{Principal, create_principal};
pub use query::{DocumentQuery, Order, PermittedResource, PermittedRows};
pub use store::{Document, Grant, GrantRelation, Store};
