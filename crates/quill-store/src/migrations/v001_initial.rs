//! v001 -- Initial schema creation.
//!
//! Creates the `posts` table that holds every board entry, root and reply
//! alike, plus the index that serves the threaded listing order.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Posts
--
-- grp / seq / depth are the threading keys: grp names the
-- conversation (a root post has grp = id, set right after insert),
-- seq is the total order inside the conversation, depth is the
-- nesting level. grp is NULL only for the instant between the two
-- phases of a root insert, inside that insert's transaction.
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS posts (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    grp        INTEGER,
    seq        INTEGER NOT NULL DEFAULT 0,
    depth      INTEGER NOT NULL DEFAULT 0,
    title      TEXT NOT NULL,
    body       TEXT NOT NULL,
    writer     TEXT NOT NULL,
    hits       INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL                 -- ISO-8601 / RFC-3339
);

-- Serves ORDER BY grp DESC, seq ASC directly.
CREATE INDEX IF NOT EXISTS idx_posts_grp_seq ON posts(grp DESC, seq ASC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
