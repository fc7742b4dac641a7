//! CRUD and threading operations for [`Post`] records.
//!
//! Two operations here carry the board's algorithmic contract:
//!
//! - [`Database::insert_root`] — two-phase insert: the row is written first,
//!   then its `grp` is set to the id SQLite just assigned, inside one
//!   transaction.
//! - [`Database::insert_reply`] — read parent, shift siblings, insert, all
//!   under one IMMEDIATE transaction. BEGIN IMMEDIATE takes the write lock
//!   up front, so concurrent replies into the same group serialize instead
//!   of interleaving their shifts. A locked database surfaces as
//!   [`StoreError::Conflict`]; callers retry via
//!   [`Database::insert_reply_with_retry`], which re-reads the parent and
//!   recomputes the keys on every attempt.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, TransactionBehavior};

use quill_shared::{
    PageRequest, PageWindow, Post, PostDraft, ReplyPlan, SearchField, SearchScope, ThreadKeys,
};

use crate::database::Database;
use crate::error::StoreError;
use crate::Result;

const POST_COLUMNS: &str = "id, grp, seq, depth, title, body, writer, hits, created_at";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a post that starts a new conversation.
    ///
    /// The group of a root post is its own id, which is only known once the
    /// row exists; the insert and the follow-up group update run in one
    /// transaction so no half-initialized root is ever visible.
    pub fn insert_root(&mut self, draft: &PostDraft) -> Result<Post> {
        let keys = ThreadKeys::root();
        let tx = self.conn_mut().transaction()?;

        let id = insert_post_row(&tx, draft, &keys, Utc::now())?;
        tx.execute("UPDATE posts SET grp = ?1 WHERE id = ?1", params![id])?;

        let post = fetch_post(&tx, id)?;
        tx.commit()?;

        tracing::debug!(id, "inserted root post");
        Ok(post)
    }

    /// Insert a reply under `parent_id`.
    ///
    /// Fails with [`StoreError::NotFound`] when the parent does not exist
    /// and with [`StoreError::Conflict`] when another writer holds the
    /// database; neither case leaves any mutation behind.
    pub fn insert_reply(&mut self, parent_id: i64, draft: &PostDraft) -> Result<Post> {
        let tx = self
            .conn_mut()
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(busy_to_conflict)?;

        let parent = fetch_post(&tx, parent_id)?;
        let plan = ReplyPlan::for_parent(&parent);

        // Make room first; inserting before the shift would collide with
        // the sibling currently holding the new sequence.
        tx.execute(
            "UPDATE posts SET seq = seq + 1 WHERE grp = ?1 AND seq >= ?2",
            params![plan.shift.group, plan.shift.from_sequence],
        )
        .map_err(busy_to_conflict)?;

        let id = insert_post_row(&tx, draft, &plan.keys, Utc::now()).map_err(busy_to_conflict)?;

        let post = fetch_post(&tx, id)?;
        tx.commit().map_err(busy_to_conflict)?;

        tracing::debug!(
            id,
            parent = parent_id,
            group = post.group,
            sequence = post.sequence,
            "inserted reply"
        );
        Ok(post)
    }

    /// [`Database::insert_reply`] with optimistic retry on [`StoreError::Conflict`].
    ///
    /// Each attempt re-reads the parent inside a fresh transaction, so keys
    /// computed against stale sibling state are never committed.
    pub fn insert_reply_with_retry(
        &mut self,
        parent_id: i64,
        draft: &PostDraft,
        max_attempts: u32,
    ) -> Result<Post> {
        let mut attempt = 1;
        loop {
            match self.insert_reply(parent_id, draft) {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::debug!(attempt, parent = parent_id, "reply conflict, retrying");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single post by id.
    pub fn get_post(&self, id: i64) -> Result<Post> {
        fetch_post(self.conn(), id)
    }

    /// Count posts matching `scope`.
    pub fn count_posts(&self, scope: &SearchScope) -> Result<i64> {
        let (filter, pattern) = scope_filter(scope);
        let sql = format!("SELECT COUNT(*) FROM posts{filter}");

        let count = match pattern {
            Some(p) => self
                .conn()
                .query_row(&sql, params![p], |row| row.get(0))?,
            None => self.conn().query_row(&sql, [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// List one window of posts in threaded order.
    ///
    /// The order `(grp DESC, seq ASC)` shows the newest conversation first
    /// and, inside each conversation, the depth-first reply order the
    /// sequence keys encode.
    pub fn list_page(&self, scope: &SearchScope, window: &PageWindow) -> Result<Vec<Post>> {
        let (filter, pattern) = scope_filter(scope);

        let mut posts = Vec::new();
        match pattern {
            Some(p) => {
                let sql = format!(
                    "SELECT {POST_COLUMNS} FROM posts{filter}
                     ORDER BY grp DESC, seq ASC LIMIT ?2 OFFSET ?3"
                );
                let mut stmt = self.conn().prepare(&sql)?;
                let rows = stmt.query_map(params![p, window.per_page, window.offset], row_to_post)?;
                for row in rows {
                    posts.push(row?);
                }
            }
            None => {
                let sql = format!(
                    "SELECT {POST_COLUMNS} FROM posts
                     ORDER BY grp DESC, seq ASC LIMIT ?1 OFFSET ?2"
                );
                let mut stmt = self.conn().prepare(&sql)?;
                let rows = stmt.query_map(params![window.per_page, window.offset], row_to_post)?;
                for row in rows {
                    posts.push(row?);
                }
            }
        }
        Ok(posts)
    }

    /// Serve one page: count the scope, resolve the window, slice the rows.
    ///
    /// This is the composition a list request goes through; the window and
    /// the slice are always computed against the same scope.
    pub fn page_posts(
        &self,
        scope: &SearchScope,
        request: &PageRequest,
    ) -> Result<(PageWindow, Vec<Post>)> {
        let total = self.count_posts(scope)?;
        let window = PageWindow::compute(request, total)?;
        let posts = self.list_page(scope, &window)?;
        Ok((window, posts))
    }

    /// Bump the view counter and return the post, as a detail view does.
    pub fn record_view(&self, id: i64) -> Result<Post> {
        let affected = self
            .conn()
            .execute("UPDATE posts SET hits = hits + 1 WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_post(id)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Update a post's content fields.  Threading keys are immutable; a
    /// post is never re-parented.  Returns `true` if a row was updated.
    pub fn update_post(&self, id: i64, draft: &PostDraft) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE posts SET title = ?1, body = ?2, writer = ?3 WHERE id = ?4",
            params![draft.title, draft.body, draft.writer, id],
        )?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a post together with its whole subtree.
    ///
    /// Deleting a root removes the entire conversation. Deleting a reply
    /// removes the reply and every post nested under it: the contiguous
    /// sequence range up to the next post at the same or shallower depth.
    /// Sequences of the surviving posts are left as-is; ordering only needs
    /// them unique, not gap-free.
    ///
    /// Returns the number of posts removed.
    pub fn delete_post(&mut self, id: i64) -> Result<usize> {
        let tx = self.conn_mut().transaction()?;

        let post = fetch_post(&tx, id)?;

        let deleted = if post.is_root() {
            tx.execute("DELETE FROM posts WHERE grp = ?1", params![post.group])?
        } else {
            // End of the subtree: the first following post that is not
            // nested under this one.
            let subtree_end: Option<i64> = tx
                .query_row(
                    "SELECT MIN(seq) FROM posts
                     WHERE grp = ?1 AND seq > ?2 AND depth <= ?3",
                    params![post.group, post.sequence, post.depth],
                    |row| row.get(0),
                )?;

            match subtree_end {
                Some(end) => tx.execute(
                    "DELETE FROM posts WHERE grp = ?1 AND seq >= ?2 AND seq < ?3",
                    params![post.group, post.sequence, end],
                )?,
                None => tx.execute(
                    "DELETE FROM posts WHERE grp = ?1 AND seq >= ?2",
                    params![post.group, post.sequence],
                )?,
            }
        };

        tx.commit()?;

        tracing::debug!(id, deleted, "deleted post subtree");
        Ok(deleted)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert one row with pre-computed threading keys; returns the new id.
fn insert_post_row(
    conn: &Connection,
    draft: &PostDraft,
    keys: &ThreadKeys,
    created_at: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO posts (grp, seq, depth, title, body, writer, hits, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
        params![
            keys.group,
            keys.sequence,
            keys.depth,
            draft.title,
            draft.body,
            draft.writer,
            created_at.to_rfc3339(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch one post, mapping the no-rows case to [`StoreError::NotFound`].
fn fetch_post(conn: &Connection, id: i64) -> Result<Post> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1");
    conn.query_row(&sql, params![id], row_to_post)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Sqlite(other),
        })
}

/// Map a `rusqlite::Row` to a [`Post`].
fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    let ts_str: String = row.get(8)?;
    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Post {
        id: row.get(0)?,
        group: row.get(1)?,
        sequence: row.get(2)?,
        depth: row.get(3)?,
        title: row.get(4)?,
        body: row.get(5)?,
        writer: row.get(6)?,
        hits: row.get(7)?,
        created_at,
    })
}

/// WHERE clause and LIKE pattern for a search scope.
fn scope_filter(scope: &SearchScope) -> (&'static str, Option<String>) {
    match scope {
        SearchScope::All => ("", None),
        SearchScope::Keyword { field, keyword } => {
            let filter = match field {
                SearchField::Title => " WHERE title LIKE ?1",
                SearchField::Body => " WHERE body LIKE ?1",
                SearchField::Writer => " WHERE writer LIKE ?1",
            };
            (filter, Some(format!("%{keyword}%")))
        }
    }
}

/// A locked database is a retryable conflict, not a hard storage failure.
fn busy_to_conflict(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) =>
        {
            StoreError::Conflict
        }
        _ => StoreError::Sqlite(e),
    }
}
