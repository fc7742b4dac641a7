//! Domain model structs persisted in the board database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A board entry, either a root post or a reply somewhere under one.
///
/// Ordering within a conversation is carried by three integer keys:
/// `group` names the conversation, `sequence` is the total order inside it,
/// `depth` is the indentation level. Listing `(group DESC, sequence ASC)`
/// reproduces the nested view from the flat table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Storage-assigned identifier, immutable after insert.
    pub id: i64,
    /// Conversation identity. A root post is self-referencing
    /// (`group == id`); every reply inherits its parent's group.
    pub group: i64,
    /// Position within the group. The root holds 0; lower sorts earlier.
    pub sequence: i64,
    /// Nesting level. Root = 0, a reply is always its parent + 1.
    pub depth: i64,
    /// Post title.
    pub title: String,
    /// Post body.
    pub body: String,
    /// Display name of the author.
    pub writer: String,
    /// View counter, bumped each time the detail view is read.
    pub hits: i64,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Whether this post starts its conversation.
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

// ---------------------------------------------------------------------------
// PostDraft
// ---------------------------------------------------------------------------

/// Author-supplied content for a new or edited post.
///
/// Ordering keys are never part of a draft; they are computed by
/// [`crate::thread::ThreadKeys`] and assigned by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub writer: String,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        writer: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            writer: writer.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// SearchScope
// ---------------------------------------------------------------------------

/// Which content column a keyword search matches against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Title,
    Body,
    Writer,
}

/// An already-qualified query filter handed to the storage layer.
///
/// The core does not decide what is searchable; it only threads this scope
/// through `count` and `list` so both see the same rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SearchScope {
    /// Every post on the board.
    All,
    /// Posts whose `field` contains `keyword` (substring match).
    Keyword { field: SearchField, keyword: String },
}

impl SearchScope {
    /// Build a keyword scope, falling back to [`SearchScope::All`] when the
    /// keyword is empty or whitespace.
    pub fn keyword(field: SearchField, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if keyword.trim().is_empty() {
            SearchScope::All
        } else {
            SearchScope::Keyword { field, keyword }
        }
    }
}

impl Default for SearchScope {
    fn default() -> Self {
        SearchScope::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_keyword_degrades_to_all() {
        assert_eq!(SearchScope::keyword(SearchField::Title, "  "), SearchScope::All);
        assert!(matches!(
            SearchScope::keyword(SearchField::Writer, "kim"),
            SearchScope::Keyword { .. }
        ));
    }

    #[test]
    fn post_serializes_with_stable_field_names() {
        let post = Post {
            id: 3,
            group: 3,
            sequence: 0,
            depth: 0,
            title: "hello".into(),
            body: "world".into(),
            writer: "writer1".into(),
            hits: 0,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["group"], 3);
        assert_eq!(json["sequence"], 0);
        assert_eq!(json["depth"], 0);
        assert_eq!(json["writer"], "writer1");
    }
}
