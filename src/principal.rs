//! Principals and their construction from verified claims.
//!
//! [`create_principal`] decides the principal kind once and binds the matching
//! accessor:
//!
//! 1. claims with a negative user or organization id are rejected
//! 2. end-users get an [`EndUserAccessor`] keyed by their group
//! 3. administrators get an [`AbsoluteAccessor`]
//! 4. everyone else gets a [`StandardAccessor`] over the organizations the
//!    account directory says they administer, plus their own organization
//!    when they carry the company-admin role
//!
//! Every failure, including an account directory outage, surfaces as the
//! payload-free [`Error::Security`]. The cause is only logged.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::accessor::{AbsoluteAccessor, BoundAccessor, EndUserAccessor, StandardAccessor};
use crate::claims::{Claims, Role, ScopeSet};
use crate::directory::AccountDirectory;
use crate::error::{Error, Result};

/// The authenticated actor permissions are resolved for.
///
/// Immutable once built. Construct one per request.
#[derive(Debug, Clone)]
pub struct Principal {
    id: i64,
    organization_id: i64,
    role: Role,
    scopes: ScopeSet,
    admin_organizations: BTreeSet<i64>,
    accessor: BoundAccessor,
}

impl Principal {
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Organization id; the end-user group id for end-users.
    pub fn organization_id(&self) -> i64 {
        self.organization_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    /// Organizations this principal administers. Empty unless a normal user.
    pub fn admin_organizations(&self) -> &BTreeSet<i64> {
        &self.admin_organizations
    }

    pub fn accessor(&self) -> &BoundAccessor {
        &self.accessor
    }
}

/// Build the principal for `claims`, consulting `directory` for normal users.
pub async fn create_principal<D>(claims: &Claims, directory: &D) -> Result<Principal>
where
    D: AccountDirectory,
{
    match build(claims, directory).await {
        Ok(principal) => {
            debug!(
                principal = principal.id,
                role = ?principal.role,
                "principal established"
            );
            Ok(principal)
        }
        Err(e) => {
            warn!(principal = claims.sub, error = %e, "principal construction failed");
            Err(Error::Security)
        }
    }
}

async fn build<D>(claims: &Claims, directory: &D) -> Result<Principal>
where
    D: AccountDirectory,
{
    if claims.sub < 0 || claims.organization_id < 0 {
        return Err(Error::InvalidArgument(format!(
            "claims carry negative ids (user {}, organization {})",
            claims.sub, claims.organization_id
        )));
    }

    let scopes = claims.scope_set();

    if claims.end_user {
        let accessor = EndUserAccessor::new(claims.sub, claims.organization_id, scopes.clone());
        return Ok(Principal {
            id: claims.sub,
            organization_id: claims.organization_id,
            role: Role::EndUser,
            scopes,
            admin_organizations: BTreeSet::new(),
            accessor: accessor.into(),
        });
    }

    if claims.is_administrator() {
        return Ok(Principal {
            id: claims.sub,
            organization_id: claims.organization_id,
            role: Role::Administrator,
            scopes,
            admin_organizations: BTreeSet::new(),
            accessor: AbsoluteAccessor.into(),
        });
    }

    let mut admin_organizations: BTreeSet<i64> = directory
        .organizations_with_admin_access(claims.sub)
        .await?
        .into_iter()
        .collect();
    if claims.is_company_administrator() {
        admin_organizations.insert(claims.organization_id);
    }

    let accessor = StandardAccessor::for_user(
        claims.sub,
        claims.organization_id,
        admin_organizations.iter().copied(),
        scopes.clone(),
    );
    Ok(Principal {
        id: claims.sub,
        organization_id: claims.organization_id,
        role: Role::NormalUser,
        scopes,
        admin_organizations,
        accessor: accessor.into(),
    })
}
