//! Explicit grants overlaid with implicit business rules.
//!
//! The explicit level of a document is the maximum of two grant relations:
//! one keyed by the principal itself, one keyed by its organization (or its
//! end-user group). Implicit rules are then applied in fixed priority, each
//! able only to raise the level:
//!
//! 1. own company: the document's owner is an organization the principal
//!    administers, `Manage`
//! 2. survey rights: scope `api.surveyrights` on a `DataTemplate` document,
//!    `Manage`
//! 3. CDL read: scope `api.cdl.read`, at least `View`
//!
//! The batch query encodes the same formula in SQL, so a point lookup and the
//! matching batch row always agree.

use std::collections::BTreeSet;

use tracing::debug;

use crate::claims::{Scope, ScopeSet};
use crate::error::Result;
use crate::permission::{Permission, ResourceStatus, combine};
use crate::query::{DocumentQuery, Fragment};
use crate::store::{DATA_TEMPLATE, Document, GrantRelation, Store};

use super::{Accessor, not_found};

/// A grant relation and the id to look up in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grantee {
    pub relation: GrantRelation,
    pub id: i64,
}

impl Grantee {
    pub fn new(relation: GrantRelation, id: i64) -> Self {
        Self { relation, id }
    }
}

/// Resolution for ordinary users, and the rule core of end-users.
#[derive(Debug, Clone)]
pub struct StandardAccessor {
    individual: Grantee,
    collective: Grantee,
    admin_organizations: BTreeSet<i64>,
    scopes: ScopeSet,
}

impl StandardAccessor {
    pub fn new(
        individual: Grantee,
        collective: Grantee,
        admin_organizations: impl IntoIterator<Item = i64>,
        scopes: ScopeSet,
    ) -> Self {
        Self {
            individual,
            collective,
            admin_organizations: admin_organizations.into_iter().collect(),
            scopes,
        }
    }

    /// Ordinary user: user grants plus grants to the user's organization.
    pub fn for_user(
        user_id: i64,
        organization_id: i64,
        admin_organizations: impl IntoIterator<Item = i64>,
        scopes: ScopeSet,
    ) -> Self {
        Self::new(
            Grantee::new(GrantRelation::User, user_id),
            Grantee::new(GrantRelation::Organization, organization_id),
            admin_organizations,
            scopes,
        )
    }

    /// End-user: end-user grants plus grants to the end-user's group.
    /// End-users never administer an organization.
    pub fn for_end_user(end_user_id: i64, group_id: i64, scopes: ScopeSet) -> Self {
        Self::new(
            Grantee::new(GrantRelation::EndUser, end_user_id),
            Grantee::new(GrantRelation::EndUserGroup, group_id),
            [],
            scopes,
        )
    }

    pub fn admin_organizations(&self) -> &BTreeSet<i64> {
        &self.admin_organizations
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    /// Implicit level from the rules, first match wins.
    fn implicit(&self, document: &Document) -> Permission {
        if self.admin_organizations.contains(&document.organization_id) {
            return Permission::Manage;
        }
        if self.scopes.contains(Scope::SurveyRights) && document.is_data_template() {
            return Permission::Manage;
        }
        if self.scopes.contains(Scope::CdlRead) {
            return Permission::View;
        }
        Permission::None
    }

    /// Resolve an already-loaded document, cheapest source first.
    pub(crate) async fn resolve(&self, store: &Store, document: &Document) -> Result<Permission> {
        let mut level = store
            .grant(self.individual.relation, document.id, self.individual.id)
            .await?;
        if level < Permission::Manage {
            let collective = store
                .grant(self.collective.relation, document.id, self.collective.id)
                .await?;
            level = combine(level, collective);
        }
        if level < Permission::Manage {
            level = combine(level, self.implicit(document));
        }
        debug!(document = document.id, %level, "resolved permission");
        Ok(level)
    }

    /// SQL form of [`Self::implicit`].
    fn implicit_sql(&self) -> Fragment {
        let manage = Permission::Manage.ordinal();
        let mut fragment = Fragment::new("CASE");

        if !self.admin_organizations.is_empty() {
            let placeholders = vec!["?"; self.admin_organizations.len()].join(", ");
            fragment.text += &format!(" WHEN d.organization_id IN ({placeholders}) THEN {manage}");
            for &organization in &self.admin_organizations {
                fragment = fragment.bind(organization);
            }
        }
        if self.scopes.contains(Scope::SurveyRights) {
            fragment.text += &format!(" WHEN d.document_type = ? THEN {manage}");
            fragment = fragment.bind(DATA_TEMPLATE.to_string());
        }

        let fallback = if self.scopes.contains(Scope::CdlRead) {
            Permission::View
        } else {
            Permission::None
        };
        if fragment.params.is_empty() {
            return Fragment::new(fallback.ordinal().to_string());
        }
        fragment.text += &format!(" ELSE {} END", fallback.ordinal());
        fragment
    }

    fn grant_join(alias: &str, grantee: Grantee) -> Fragment {
        Fragment::new(format!(
            "LEFT JOIN {table} {alias} ON {alias}.document_id = d.id AND {alias}.grantee_id = ?",
            table = grantee.relation.table()
        ))
        .bind(grantee.id)
    }
}

impl Accessor for StandardAccessor {
    fn query(&self) -> DocumentQuery {
        let implicit = self.implicit_sql();
        let mut permission = Fragment::new(format!(
            "MAX(COALESCE(gi.permission, 0), COALESCE(gc.permission, 0), {})",
            implicit.text
        ));
        permission.params = implicit.params;

        DocumentQuery::new(permission)
            .join(Self::grant_join("gi", self.individual))
            .join(Self::grant_join("gc", self.collective))
    }

    async fn permission_of(
        &self,
        store: &Store,
        id: i64,
        status: ResourceStatus,
    ) -> Result<Permission> {
        let document = store
            .document(id, status)
            .await?
            .ok_or_else(|| not_found(id, status))?;
        self.resolve(store, &document).await
    }
}
