mod factory;
mod scenarios;

use docaccess::{GrantRelation, Permission, Store};
use libsql::Value;

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub const C1: i64 = 1;
pub const C2: i64 = 2;
pub const C3: i64 = 3;

/// Fresh in-memory store with the tables applied.
pub async fn empty_store() -> Store {
    let db = docaccess::db::connect(":memory:")
        .await
        .expect("failed to open database");
    let conn = docaccess::db::connection(&db).expect("failed to connect");
    docaccess::db::apply_schema(&conn)
        .await
        .expect("failed to apply schema");
    Store::new(conn)
}

/// Store holding the shared collection:
///
/// | id | owner | state |
/// |----|-------|-------|
/// | 1  | C1    | live, unpublished |
/// | 2  | C1    | live, unpublished |
/// | 3  | C2    | live, unpublished |
/// | 4  | C3    | live, unpublished, DataTemplate |
/// | 5  | C2    | live, published |
/// | 6  | C1    | deleted, published |
pub async fn seeded_store() -> Store {
    let store = empty_store().await;
    insert_document(&store, 1, C1, false, false, "Survey").await;
    insert_document(&store, 2, C1, false, false, "Survey").await;
    insert_document(&store, 3, C2, false, false, "Survey").await;
    insert_document(&store, 4, C3, false, false, "DataTemplate").await;
    insert_document(&store, 5, C2, false, true, "Survey").await;
    insert_document(&store, 6, C1, true, true, "Survey").await;
    store
}

pub async fn insert_document(
    store: &Store,
    id: i64,
    organization_id: i64,
    deleted: bool,
    published: bool,
    kind: &str,
) {
    let deleted_at = if deleted {
        Value::Text("2024-05-01T08:30:00Z".into())
    } else {
        Value::Null
    };
    let published_revision_id = if published {
        Value::Integer(id + 1000)
    } else {
        Value::Null
    };
    store
        .connection()
        .execute(
            "INSERT INTO documents (id, organization_id, deleted_at, published_revision_id, document_type) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            vec![
                Value::Integer(id),
                Value::Integer(organization_id),
                deleted_at,
                published_revision_id,
                Value::Text(kind.into()),
            ],
        )
        .await
        .expect("failed to insert document");
}

pub async fn grant(
    store: &Store,
    relation: GrantRelation,
    document_id: i64,
    grantee_id: i64,
    permission: Permission,
) {
    let table = match relation {
        GrantRelation::User => "user_grants",
        GrantRelation::Organization => "organization_grants",
        GrantRelation::EndUser => "end_user_grants",
        GrantRelation::EndUserGroup => "end_user_group_grants",
    };
    store
        .connection()
        .execute(
            &format!(
                "INSERT INTO {table} (document_id, grantee_id, permission) VALUES (?1, ?2, ?3)"
            ),
            [document_id, grantee_id, permission.ordinal()],
        )
        .await
        .expect("failed to insert grant");
}

/// `(id, permission)` pairs of a collected batch result.
pub fn levels(resources: &[docaccess::PermittedResource]) -> Vec<(i64, Permission)> {
    resources
        .iter()
        .map(|r| (r.document.id, r.permission))
        .collect()
}
