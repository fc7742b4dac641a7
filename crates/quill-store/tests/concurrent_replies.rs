//! Concurrent reply insertion must never produce duplicate sequence values.
//!
//! Two OS threads with independent connections to the same database file
//! race replies into one conversation. BEGIN IMMEDIATE serializes the
//! writers and the retry wrapper absorbs busy/locked conflicts, so every
//! committed reply must hold a distinct (group, sequence) slot.

use std::collections::HashSet;
use std::thread;

use quill_shared::{PageRequest, PostDraft, SearchScope};
use quill_store::Database;

const REPLIES_PER_WRITER: usize = 20;
const MAX_ATTEMPTS: u32 = 100;

#[test]
fn racing_replies_keep_sequences_unique() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");

    let root = {
        let mut db = Database::open_at(&path).unwrap();
        db.insert_root(&PostDraft::new("root", "body", "writer1"))
            .unwrap()
    };

    let handles: Vec<_> = (0..2)
        .map(|writer| {
            let path = path.clone();
            thread::spawn(move || {
                let mut db = Database::open_at(&path).unwrap();
                for i in 0..REPLIES_PER_WRITER {
                    let draft = PostDraft::new(
                        format!("w{writer}-r{i}"),
                        "body",
                        format!("writer{writer}"),
                    );
                    db.insert_reply_with_retry(root.id, &draft, MAX_ATTEMPTS)
                        .expect("reply should eventually commit");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let (window, posts) = db
        .page_posts(&SearchScope::All, &PageRequest::new(1, 200))
        .unwrap();

    let expected = 1 + 2 * REPLIES_PER_WRITER as i64;
    assert_eq!(window.total_count, expected);

    let mut slots = HashSet::new();
    for post in &posts {
        assert!(
            slots.insert((post.group, post.sequence)),
            "duplicate slot for post {}: ({}, {})",
            post.id,
            post.group,
            post.sequence
        );
        assert_eq!(post.group, root.group);
    }
    assert_eq!(slots.len(), expected as usize);

    // Every reply still sits one level under something that exists: the
    // flat order must read as a valid nested view.
    let mut prev_depth = -1i64;
    for post in &posts {
        assert!(post.depth <= prev_depth + 1, "depth jumped at post {}", post.id);
        prev_depth = post.depth;
    }
}
