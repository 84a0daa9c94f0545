//! SQL schema for the Quill SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS posts (
    id               TEXT PRIMARY KEY,
    title            TEXT NOT NULL UNIQUE,
    slug             TEXT NOT NULL UNIQUE,
    content          TEXT NOT NULL,
    tags             TEXT NOT NULL DEFAULT '[]',   -- JSON array
    views            INTEGER NOT NULL DEFAULT 0,
    is_featured      INTEGER NOT NULL DEFAULT 0,
    reading_time     INTEGER NOT NULL,
    meta_title       TEXT,
    meta_description TEXT,
    meta_keywords    TEXT NOT NULL DEFAULT '[]',   -- JSON array
    image            TEXT,
    published_at     TEXT NOT NULL,                -- RFC 3339 UTC
    created_at       TEXT NOT NULL
);

-- Comments are stored flat; replies point at their parent.
-- parent_id has no foreign key: deleting a parent leaves its
-- replies in place.
CREATE TABLE IF NOT EXISTS comments (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,  -- insertion order tiebreak
    id         TEXT NOT NULL UNIQUE,
    post_id    TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    author     TEXT NOT NULL,
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL,                      -- RFC 3339 UTC; server-assigned
    parent_id  TEXT,
    like_count INTEGER NOT NULL DEFAULT 0,
    CHECK (parent_id IS NULL OR parent_id != id)
);

-- At most one row per post.
CREATE TABLE IF NOT EXISTS post_analytics (
    post_id         TEXT PRIMARY KEY REFERENCES posts(id) ON DELETE CASCADE,
    views           INTEGER NOT NULL DEFAULT 0,
    shares          INTEGER NOT NULL DEFAULT 0,
    likes           INTEGER NOT NULL DEFAULT 0,
    comments        INTEGER NOT NULL DEFAULT 0,
    engagement_rate REAL    NOT NULL DEFAULT 0,
    updated_at      TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS subscribers (
    id         TEXT PRIMARY KEY,
    email      TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL
);

-- Singleton row.
CREATE TABLE IF NOT EXISTS site_stats (
    id         INTEGER PRIMARY KEY CHECK (id = 1),
    visitors   INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS comments_post_idx   ON comments(post_id, created_at);
CREATE INDEX IF NOT EXISTS comments_parent_idx ON comments(parent_id);
CREATE INDEX IF NOT EXISTS posts_views_idx     ON posts(views);

PRAGMA user_version = 2;
";
