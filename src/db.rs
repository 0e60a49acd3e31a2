//! Database connection and the table layout the grant store reads.
//!
//! Supports multiple backends:
//! - Local SQLite file: `path/to/db.sqlite` or `file:path` or `sqlite://path`
//! - In-memory: `:memory:`
//! - Remote Turso: `libsql://...` or `https://...` (requires TURSO_AUTH_TOKEN env var)
//!
//! Documents and grants are written by the surrounding service. This crate
//! only reads them; [`SCHEMA`] describes the columns it expects.

use libsql::{Builder, Connection, Database};

/// Tables read by [`crate::store::Store`].
///
/// Permission levels are stored as ordinals (`0` none, `1` view, `2` manage)
/// and `deleted_at` as an RFC 3339 timestamp (`NULL` while the document exists).
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY,
    organization_id INTEGER NOT NULL,
    deleted_at TEXT,
    published_revision_id INTEGER,
    document_type TEXT NOT NULL DEFAULT 'Document'
);
CREATE INDEX IF NOT EXISTS documents_organization ON documents (organization_id);

CREATE TABLE IF NOT EXISTS user_grants (
    document_id INTEGER NOT NULL REFERENCES documents (id),
    grantee_id INTEGER NOT NULL,
    permission INTEGER NOT NULL,
    PRIMARY KEY (document_id, grantee_id)
);
CREATE INDEX IF NOT EXISTS user_grants_grantee ON user_grants (grantee_id);

CREATE TABLE IF NOT EXISTS organization_grants (
    document_id INTEGER NOT NULL REFERENCES documents (id),
    grantee_id INTEGER NOT NULL,
    permission INTEGER NOT NULL,
    PRIMARY KEY (document_id, grantee_id)
);
CREATE INDEX IF NOT EXISTS organization_grants_grantee ON organization_grants (grantee_id);

CREATE TABLE IF NOT EXISTS end_user_grants (
    document_id INTEGER NOT NULL REFERENCES documents (id),
    grantee_id INTEGER NOT NULL,
    permission INTEGER NOT NULL,
    PRIMARY KEY (document_id, grantee_id)
);
CREATE INDEX IF NOT EXISTS end_user_grants_grantee ON end_user_grants (grantee_id);

CREATE TABLE IF NOT EXISTS end_user_group_grants (
    document_id INTEGER NOT NULL REFERENCES documents (id),
    grantee_id INTEGER NOT NULL,
    permission INTEGER NOT NULL,
    PRIMARY KEY (document_id, grantee_id)
);
CREATE INDEX IF NOT EXISTS end_user_group_grants_grantee ON end_user_group_grants (grantee_id);
"#;

/// Connect to the database.
///
/// # URL formats
/// - Local file: `mydata.db`, `file:path/to/db.sqlite`, `sqlite://path`
/// - In-memory: `:memory:`
/// - Remote Turso: `libsql://your-db.turso.io` (requires `TURSO_AUTH_TOKEN` env var)
pub async fn connect(url: &str) -> crate::Result<Database> {
    let db = if url.starts_with("libsql://") || url.starts_with("https://") {
        let token = std::env::var("TURSO_AUTH_TOKEN").map_err(|_| {
            crate::Error::Config("TURSO_AUTH_TOKEN not set for remote database".into())
        })?;
        Builder::new_remote(url.to_string(), token).build().await?
    } else if url == ":memory:" {
        Builder::new_local(":memory:").build().await?
    } else {
        // Local file - strip sqlite:// or file: prefix if present
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("file:"))
            .unwrap_or(url);
        Builder::new_local(path).build().await?
    };

    Ok(db)
}

/// Get a connection from the database.
///
/// Every connection to a `:memory:` database sees its own empty database, so
/// in-memory callers must keep using the connection they created tables on.
pub fn connection(db: &Database) -> crate::Result<Connection> {
    Ok(db.connect()?)
}

/// Create the tables in [`SCHEMA`] if they are missing.
pub async fn apply_schema(conn: &Connection) -> crate::Result<()> {
    conn.execute_batch(SCHEMA).await?;
    tracing::debug!("schema applied");
    Ok(())
}
