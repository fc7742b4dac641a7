//! Hierarchical reply ordering.
//!
//! A conversation lives in a flat table; three integer keys per post are
//! enough for storage to serve the nested view with a single
//! `ORDER BY (group DESC, sequence ASC)` query. This module computes those
//! keys for new posts and the compensating shift that keeps `sequence`
//! values unique when a reply is wedged in directly under its parent.
//!
//! The computations here are pure. The storage layer is responsible for
//! executing a [`ReplyPlan`] atomically (shift, then insert, one
//! transaction) — interleaving two plans for the same group corrupts the
//! order.

use serde::{Deserialize, Serialize};

use crate::models::Post;

/// Ordering keys assigned to a new post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadKeys {
    /// Conversation the post belongs to. `None` for a fresh root: its group
    /// is its own id, which storage only knows after the insert.
    pub group: Option<i64>,
    /// Position within the group.
    pub sequence: i64,
    /// Nesting level.
    pub depth: i64,
}

impl ThreadKeys {
    /// Keys for a post that starts a new conversation.
    ///
    /// The group is left unassigned; storage inserts the row, reads back the
    /// assigned id, and sets `group = id` as the second half of a two-phase
    /// insert. Root posts are the only case where `group` derives from `id`.
    pub fn root() -> Self {
        Self {
            group: None,
            sequence: 0,
            depth: 0,
        }
    }

    /// Keys for a reply to `parent`, placing it immediately after the parent
    /// rather than at the end of the group. That is what makes the board
    /// threaded: a reply renders directly under what it replies to.
    pub fn reply_to(parent: &Post) -> Self {
        Self {
            group: Some(parent.group),
            sequence: parent.sequence + 1,
            depth: parent.depth + 1,
        }
    }
}

/// The sequence renumbering that must precede a reply insert.
///
/// Every existing post in `group` with `sequence >= from_sequence` moves one
/// step later, opening the slot the new reply takes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SequenceShift {
    pub group: i64,
    pub from_sequence: i64,
}

/// Everything storage needs to place one reply: the keys the new row gets
/// and the shift that makes room for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyPlan {
    pub keys: ThreadKeys,
    pub shift: SequenceShift,
}

impl ReplyPlan {
    /// Plan the insertion of a reply under `parent`.
    pub fn for_parent(parent: &Post) -> Self {
        let keys = ThreadKeys::reply_to(parent);
        Self {
            keys,
            shift: SequenceShift {
                group: parent.group,
                from_sequence: keys.sequence,
            },
        }
    }
}
