//! SQL schema for the StopIDCheck SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sites (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL UNIQUE,
    url               TEXT NOT NULL DEFAULT '',
    category          TEXT NOT NULL DEFAULT '',   -- comma-separated tags
    description       TEXT NOT NULL DEFAULT '',
    verification_type TEXT NOT NULL DEFAULT '',
    context           TEXT NOT NULL DEFAULT '',
    date_in_effect    TEXT NOT NULL DEFAULT '',
    status            TEXT NOT NULL DEFAULT '',
    country           TEXT NOT NULL DEFAULT '',   -- comma-separated codes
    sources           TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS alternatives (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    site_id         INTEGER NOT NULL REFERENCES sites(id) ON DELETE CASCADE,
    alt_name        TEXT NOT NULL,
    alt_url         TEXT NOT NULL DEFAULT '',
    alt_description TEXT NOT NULL DEFAULT '',
    UNIQUE (site_id, alt_name)
);

-- Pending submissions. Approval copies a row into `sites`, then deletes it.
CREATE TABLE IF NOT EXISTS suggestions (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL,
    url               TEXT NOT NULL,
    category          TEXT NOT NULL,
    verification_type TEXT NOT NULL DEFAULT '',
    country           TEXT NOT NULL DEFAULT '',
    description       TEXT NOT NULL DEFAULT '',
    submitted_at      TEXT NOT NULL               -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS suggestion_alternatives (
    suggestion_id INTEGER NOT NULL REFERENCES suggestions(id) ON DELETE CASCADE,
    position      INTEGER NOT NULL,
    name          TEXT NOT NULL,
    url           TEXT NOT NULL DEFAULT '',
    description   TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (suggestion_id, position)
);

CREATE INDEX IF NOT EXISTS alternatives_site_idx ON alternatives(site_id);

PRAGMA user_version = 1;
";
