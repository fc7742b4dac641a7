//! # quill-store
//!
//! SQLite-backed storage for the Quill board.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for the post table:
//! windowed listing, two-phase root insertion and the transactional
//! shift-then-insert that places replies. Reply insertion is the only
//! operation with a real concurrency contract; see [`posts`] for the
//! locking and retry story.

pub mod database;
pub mod migrations;
pub mod posts;

mod error;

pub use database::Database;
pub use error::StoreError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
