//! SQL schema for the blob store.
//!
//! A single key-value table; each value is an opaque JSON text blob.

/// Returns the full SQL schema as a single batch string.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    "#
}
