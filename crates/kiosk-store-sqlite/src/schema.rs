//! SQL schema for the kiosk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS branches (
    branch_id   TEXT PRIMARY KEY,
    code        TEXT NOT NULL UNIQUE,   -- upper-case, 1-10 chars
    name        TEXT NOT NULL,
    description TEXT,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

-- Subscriptions are append-only.
CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    branch_id       TEXT NOT NULL REFERENCES branches(branch_id),
    list_id         INTEGER NOT NULL,
    created_at      TEXT NOT NULL,      -- ISO 8601 UTC; store-assigned
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    email           TEXT NOT NULL,
    dob             TEXT NOT NULL,
    phone           TEXT NOT NULL DEFAULT '',
    street          TEXT NOT NULL DEFAULT '',
    postal_code     TEXT NOT NULL DEFAULT '',
    city            TEXT NOT NULL DEFAULT '',
    province        TEXT NOT NULL DEFAULT '',
    country         TEXT NOT NULL DEFAULT '',
    branch_code     TEXT NOT NULL DEFAULT '',
    agree           INTEGER NOT NULL,
    signature       TEXT NOT NULL,
    children_json   TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS subscriptions_branch_idx  ON subscriptions(branch_id);
CREATE INDEX IF NOT EXISTS subscriptions_created_idx ON subscriptions(created_at);

PRAGMA user_version = 1;
";
