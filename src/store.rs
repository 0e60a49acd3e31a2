//! Read-only access to documents and the four explicit-grant relations.

use libsql::{Connection, Row, Value};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::permission::{Permission, ResourceStatus};

/// Document type tag that the survey-rights rule applies to.
pub const DATA_TEMPLATE: &str = "DataTemplate";

/// Columns selected for a [`Document`], in [`Document::from_row`] order.
pub(crate) const DOCUMENT_COLUMNS: &str =
    "d.id, d.organization_id, d.deleted_at, d.published_revision_id, d.document_type";

/// A protected resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: i64,
    /// Owning organization.
    pub organization_id: i64,
    /// Soft-delete timestamp. `None` while the document exists.
    pub deleted: Option<jiff::Timestamp>,
    /// `None` until the document is first published.
    pub published_revision_id: Option<i64>,
    /// Type tag.
    pub kind: String,
}

impl Document {
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }

    pub fn is_published(&self) -> bool {
        self.published_revision_id.is_some()
    }

    pub fn is_data_template(&self) -> bool {
        self.kind == DATA_TEMPLATE
    }

    pub fn status(&self) -> ResourceStatus {
        if self.is_deleted() {
            ResourceStatus::Archived
        } else {
            ResourceStatus::Exists
        }
    }

    /// Decode the five columns of [`DOCUMENT_COLUMNS`] starting at index 0.
    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        let deleted = match row.get_value(2)? {
            Value::Null => None,
            Value::Text(text) => Some(text.parse::<jiff::Timestamp>().map_err(|e| {
                Error::Corrupt(format!("deleted_at '{text}' is not a timestamp: {e}"))
            })?),
            other => {
                return Err(Error::Corrupt(format!(
                    "deleted_at has unexpected value {other:?}"
                )));
            }
        };

        Ok(Self {
            id: row.get::<i64>(0)?,
            organization_id: row.get::<i64>(1)?,
            deleted,
            published_revision_id: optional_integer(row, 3)?,
            kind: row.get::<String>(4)?,
        })
    }
}

/// Grantee kind, one relation each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantRelation {
    User,
    Organization,
    EndUser,
    EndUserGroup,
}

impl GrantRelation {
    pub const ALL: [GrantRelation; 4] = [
        GrantRelation::User,
        GrantRelation::Organization,
        GrantRelation::EndUser,
        GrantRelation::EndUserGroup,
    ];

    pub(crate) const fn table(self) -> &'static str {
        match self {
            GrantRelation::User => "user_grants",
            GrantRelation::Organization => "organization_grants",
            GrantRelation::EndUser => "end_user_grants",
            GrantRelation::EndUserGroup => "end_user_group_grants",
        }
    }
}

/// One explicit grant row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub document_id: i64,
    pub grantee_id: i64,
    pub permission: Permission,
}

impl Grant {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            document_id: row.get::<i64>(0)?,
            grantee_id: row.get::<i64>(1)?,
            permission: Permission::from_ordinal(row.get::<i64>(2)?)?,
        })
    }
}

/// Grant store handle over a single libsql connection.
///
/// Cloning shares the connection.
#[derive(Clone)]
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Fetch a document if it exists under `status`.
    pub async fn document(&self, id: i64, status: ResourceStatus) -> Result<Option<Document>> {
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents d WHERE d.id = ?1 AND {}",
            status.predicate("d")
        );
        let mut rows = self.conn.query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Document::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Whether a document with `id` exists under `status`.
    pub async fn exists(&self, id: i64, status: ResourceStatus) -> Result<bool> {
        let sql = format!(
            "SELECT 1 FROM documents d WHERE d.id = ?1 AND {}",
            status.predicate("d")
        );
        let mut rows = self.conn.query(&sql, [id]).await?;
        Ok(rows.next().await?.is_some())
    }

    /// Explicit grant level for one `(document, grantee)` pair. A missing row is `None`.
    pub async fn grant(
        &self,
        relation: GrantRelation,
        document_id: i64,
        grantee_id: i64,
    ) -> Result<Permission> {
        let sql = format!(
            "SELECT permission FROM {} WHERE document_id = ?1 AND grantee_id = ?2",
            relation.table()
        );
        let mut rows = self.conn.query(&sql, [document_id, grantee_id]).await?;
        match rows.next().await? {
            Some(row) => Permission::from_ordinal(row.get::<i64>(0)?),
            None => Ok(Permission::None),
        }
    }

    /// All grants of `relation` on one document.
    pub async fn grants_for_document(
        &self,
        relation: GrantRelation,
        document_id: i64,
    ) -> Result<Vec<Grant>> {
        self.grants_where(relation, "document_id", document_id).await
    }

    /// All grants of `relation` held by one grantee.
    pub async fn grants_for_grantee(
        &self,
        relation: GrantRelation,
        grantee_id: i64,
    ) -> Result<Vec<Grant>> {
        self.grants_where(relation, "grantee_id", grantee_id).await
    }

    async fn grants_where(
        &self,
        relation: GrantRelation,
        column: &'static str,
        value: i64,
    ) -> Result<Vec<Grant>> {
        let sql = format!(
            "SELECT document_id, grantee_id, permission FROM {} WHERE {column} = ?1 \
             ORDER BY document_id, grantee_id",
            relation.table()
        );
        let mut rows = self.conn.query(&sql, [value]).await?;
        let mut grants = Vec::new();
        while let Some(row) = rows.next().await? {
            grants.push(Grant::from_row(&row)?);
        }
        Ok(grants)
    }
}

pub(crate) fn optional_integer(row: &Row, idx: i32) -> Result<Option<i64>> {
    match row.get_value(idx)? {
        Value::Null => Ok(None),
        Value::Integer(value) => Ok(Some(value)),
        other => Err(Error::Corrupt(format!(
            "column {idx} has unexpected value {other:?}"
        ))),
    }
}
