//! Verified principal claims and the role/scope vocabulary recognised in them.
//!
//! Role and scope names are matched literally against fixed sets. Any other
//! role or scope value carried by the claims source is ignored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Role names that make a principal an administrator.
pub const ADMINISTRATOR_ROLES: [&str; 2] = ["Administrator", "SystemAdministrator"];

/// Role name granting administrative rights over the principal's own organization.
pub const COMPANY_ADMINISTRATOR_ROLE: &str = "CompanyAdministrator";

/// Principal kind. Exactly one per principal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    NormalUser,
    EndUser,
}

/// Recognised scope tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// `api.surveyrights`: manage data templates.
    SurveyRights,
    /// `api.cdl.read`: view every document.
    CdlRead,
}

impl Scope {
    /// Claim value for this scope.
    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::SurveyRights => "api.surveyrights",
            Scope::CdlRead => "api.cdl.read",
        }
    }

    /// Match a raw claim value. Unknown values yield `None`.
    pub fn from_claim(value: &str) -> Option<Self> {
        match value {
            "api.surveyrights" => Some(Scope::SurveyRights),
            "api.cdl.read" => Some(Scope::CdlRead),
            _ => None,
        }
    }
}

/// Whitelisted scopes held by a principal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only recognised scope values.
    pub fn from_claims<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        Self(values.into_iter().filter_map(Scope::from_claim).collect())
    }

    pub fn contains(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Claims of an already-authenticated principal.
///
/// For end-users `organization_id` carries the end-user group id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Principal id.
    pub sub: i64,
    /// Organization id (end-user group id for end-users).
    pub organization_id: i64,
    /// Role names.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Scope values.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// OAuth-style space-delimited scope string, merged with `scopes`.
    #[serde(default)]
    pub scope: Option<String>,
    /// Whether the principal is an end-user.
    #[serde(default)]
    pub end_user: bool,
}

impl Claims {
    /// Whether any administrator role name is present.
    pub fn is_administrator(&self) -> bool {
        self.roles
            .iter()
            .any(|r| ADMINISTRATOR_ROLES.contains(&r.as_str()))
    }

    /// Whether the company-admin role name is present.
    pub fn is_company_administrator(&self) -> bool {
        self.roles.iter().any(|r| r == COMPANY_ADMINISTRATOR_ROLE)
    }

    /// All scope values from both claim shapes.
    pub fn scope_values(&self) -> impl Iterator<Item = &str> {
        self.scopes
            .iter()
            .map(String::as_str)
            .chain(self.scope.iter().flat_map(|s| s.split_whitespace()))
    }

    /// Recognised scopes only.
    pub fn scope_set(&self) -> ScopeSet {
        ScopeSet::from_claims(self.scope_values())
    }
}
