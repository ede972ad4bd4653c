//! SQL schema for the scorebook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS scoring_pages (
    page_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    content_hash TEXT NOT NULL UNIQUE,   -- sha-256 hex of the markup; page identity
    validated    INTEGER NOT NULL DEFAULT 0,
    integrated   INTEGER NOT NULL DEFAULT 0,
    tested       INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL           -- ISO 8601 UTC
);

-- Catalog rows are written once during integration and never updated.
CREATE TABLE IF NOT EXISTS game_modes (
    mode_id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL REFERENCES scoring_pages(page_id) ON DELETE CASCADE,
    name    TEXT NOT NULL,
    UNIQUE (page_id, name)
);

CREATE TABLE IF NOT EXISTS scoring_items (
    item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL REFERENCES scoring_pages(page_id) ON DELETE CASCADE,
    name    TEXT NOT NULL,
    kind    TEXT NOT NULL,               -- 'tally' | 'flag'
    UNIQUE (page_id, name)
);

CREATE TABLE IF NOT EXISTS teams (
    event_code  TEXT NOT NULL,
    team_number INTEGER NOT NULL,
    name        TEXT NOT NULL,
    PRIMARY KEY (event_code, team_number)
);

CREATE TABLE IF NOT EXISTS matches (
    event_code   TEXT NOT NULL,
    match_number INTEGER NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    red1         INTEGER NOT NULL DEFAULT -1,
    red2         INTEGER NOT NULL DEFAULT -1,
    red3         INTEGER NOT NULL DEFAULT -1,
    blue1        INTEGER NOT NULL DEFAULT -1,
    blue2        INTEGER NOT NULL DEFAULT -1,
    blue3        INTEGER NOT NULL DEFAULT -1,
    scored       INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (event_code, match_number)
);

-- Score rows are immutable facts. No UPDATE is ever issued against this
-- table; DELETE happens only on event reset. The UNIQUE constraint is the
-- serialization point making a resubmitted tuple fail rather than overwrite.
CREATE TABLE IF NOT EXISTS scores (
    score_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id      INTEGER NOT NULL REFERENCES scoring_pages(page_id),
    mode_id      INTEGER NOT NULL REFERENCES game_modes(mode_id),
    item_id      INTEGER NOT NULL REFERENCES scoring_items(item_id),
    event_code   TEXT NOT NULL,
    team_number  INTEGER NOT NULL,
    match_number INTEGER NOT NULL,
    value        TEXT NOT NULL,
    UNIQUE (page_id, event_code, team_number, item_id, match_number, mode_id)
);

CREATE INDEX IF NOT EXISTS scores_team_idx  ON scores(event_code, team_number, page_id);
CREATE INDEX IF NOT EXISTS scores_event_idx ON scores(event_code, page_id);

PRAGMA user_version = 1;
";
