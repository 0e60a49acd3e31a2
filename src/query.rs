//! Deferred batch queries over the document collection.
//!
//! An accessor describes how permission is computed for each document; the
//! caller narrows the result with typed filters and paging. Nothing runs until
//! [`DocumentQuery::fetch`], [`DocumentQuery::collect`] or
//! [`DocumentQuery::count`] is awaited, and every filter is pushed down into
//! the single SQL statement that is then executed.
//!
//! # Example
//!
//! ```ignore
//! let page = principal
//!     .accessor()
//!     .query()
//!     .with_status(ResourceStatus::Exists)
//!     .at_least(Permission::View)
//!     .limit(20)
//!     .offset(40)
//!     .collect(&store)
//!     .await?;
//! ```

use libsql::Value;
use serde::Serialize;

use crate::error::Result;
use crate::permission::{Permission, ResourceStatus};
use crate::store::{DOCUMENT_COLUMNS, Document, Store};

/// A document paired with the permission computed for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermittedResource {
    pub document: Document,
    pub permission: Permission,
}

/// SQL fragment with the values bound to its `?` placeholders, in order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Fragment {
    pub text: String,
    pub params: Vec<Value>,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<Value>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Id,
    IdDesc,
}

/// Lazily evaluated batch query.
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    permission: Fragment,
    joins: Vec<Fragment>,
    gates: Vec<Fragment>,
    filters: Vec<Fragment>,
    order: Order,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl DocumentQuery {
    /// Query computing each document's permission with `permission`, an SQL
    /// expression over the `documents d` row and any joined relations.
    pub(crate) fn new(permission: Fragment) -> Self {
        Self {
            permission,
            joins: Vec::new(),
            gates: Vec::new(),
            filters: Vec::new(),
            order: Order::default(),
            limit: None,
            offset: None,
        }
    }

    pub(crate) fn join(mut self, join: Fragment) -> Self {
        self.joins.push(join);
        self
    }

    /// Visibility restriction imposed by the accessor, applied before permission.
    pub(crate) fn gate(mut self, gate: Fragment) -> Self {
        self.gates.push(gate);
        self
    }

    fn filter(mut self, filter: Fragment) -> Self {
        self.filters.push(filter);
        self
    }

    /// Only documents in `status`.
    pub fn with_status(self, status: ResourceStatus) -> Self {
        self.filter(Fragment::new(status.predicate("d")))
    }

    /// Only documents owned by `organization_id`.
    pub fn in_organization(self, organization_id: i64) -> Self {
        self.filter(Fragment::new("d.organization_id = ?").bind(organization_id))
    }

    /// Only documents with type tag `kind`.
    pub fn of_type(self, kind: &str) -> Self {
        self.filter(Fragment::new("d.document_type = ?").bind(kind.to_string()))
    }

    /// Only documents whose id is in `ids`.
    pub fn with_ids(self, ids: &[i64]) -> Self {
        if ids.is_empty() {
            return self.filter(Fragment::new("0"));
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut fragment = Fragment::new(format!("d.id IN ({placeholders})"));
        fragment.params = ids.iter().map(|&id| Value::Integer(id)).collect();
        self.filter(fragment)
    }

    /// Only documents resolved to at least `level`.
    pub fn at_least(self, level: Permission) -> Self {
        self.filter(Fragment::new("d.permission >= ?").bind(level.ordinal()))
    }

    pub fn order_by(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The permitted set with filters applied, as a subquery aliased `d`.
    fn permitted(&self) -> Fragment {
        let mut sql = format!(
            "SELECT {DOCUMENT_COLUMNS}, {} AS permission FROM documents d",
            self.permission.text
        );
        let mut params = self.permission.params.clone();

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.text);
            params.extend(join.params.iter().cloned());
        }
        push_conditions(&mut sql, &mut params, &self.gates);

        let mut outer = format!("FROM ({sql}) AS d WHERE d.permission > 0");
        for filter in &self.filters {
            outer.push_str(" AND ");
            outer.push_str(&filter.text);
            params.extend(filter.params.iter().cloned());
        }

        Fragment {
            text: outer,
            params,
        }
    }

    /// Full statement including ordering and paging.
    pub(crate) fn to_sql(&self) -> Fragment {
        let permitted = self.permitted();
        let mut sql = format!("SELECT {DOCUMENT_COLUMNS}, d.permission {}", permitted.text);
        let mut params = permitted.params;

        sql.push_str(match self.order {
            Order::Id => " ORDER BY d.id",
            Order::IdDesc => " ORDER BY d.id DESC",
        });
        if self.limit.is_some() || self.offset.is_some() {
            // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(self.limit.map_or(-1, clamp)));
            if let Some(offset) = self.offset {
                sql.push_str(" OFFSET ?");
                params.push(Value::Integer(clamp(offset)));
            }
        }

        Fragment { text: sql, params }
    }

    /// Execute and return a row cursor.
    pub async fn fetch(&self, store: &Store) -> Result<PermittedRows> {
        let statement = self.to_sql();
        tracing::debug!(sql = %statement.text, "fetching permitted documents");
        let rows = store
            .connection()
            .query(&statement.text, statement.params)
            .await?;
        Ok(PermittedRows { rows })
    }

    /// Execute and materialize every row.
    pub async fn collect(&self, store: &Store) -> Result<Vec<PermittedResource>> {
        let mut rows = self.fetch(store).await?;
        let mut resources = Vec::new();
        while let Some(resource) = rows.next().await? {
            resources.push(resource);
        }
        Ok(resources)
    }

    /// Number of matching documents, ignoring paging.
    pub async fn count(&self, store: &Store) -> Result<u64> {
        let permitted = self.permitted();
        let sql = format!("SELECT COUNT(*) {}", permitted.text);
        let mut rows = store.connection().query(&sql, permitted.params).await?;
        let count = match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn push_conditions(sql: &mut String, params: &mut Vec<Value>, conditions: &[Fragment]) {
    for (i, condition) in conditions.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        sql.push_str(&condition.text);
        params.extend(condition.params.iter().cloned());
    }
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Cursor over the rows of an executed [`DocumentQuery`].
pub struct PermittedRows {
    rows: libsql::Rows,
}

impl PermittedRows {
    /// Next permitted document, or `None` when exhausted.
    pub async fn next(&mut self) -> Result<Option<PermittedResource>> {
        let Some(row) = self.rows.next().await? else {
            return Ok(None);
        };
        let document = Document::from_row(&row)?;
        let permission = Permission::from_ordinal(row.get::<i64>(5)?)?;
        Ok(Some(PermittedResource {
            document,
            permission,
        }))
    }
}
