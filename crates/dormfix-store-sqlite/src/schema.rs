//! SQL schema for the dormfix key-value mirror.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout; future migrations will be gated on that number.

pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per mirrored document. Values are opaque JSON text.
CREATE TABLE IF NOT EXISTS kv (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL     -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
