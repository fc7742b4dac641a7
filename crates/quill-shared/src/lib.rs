//! # quill-shared
//!
//! Domain types and the two algorithmic subsystems of the Quill board:
//! pagination windowing ([`pager`]) and hierarchical reply ordering
//! ([`thread`]).
//!
//! Everything in this crate is pure computation: no I/O, no interior
//! mutation. The storage layer (`quill-store`) executes the plans these
//! modules produce; a presentation layer consumes the structs they return.

pub mod models;
pub mod pager;
pub mod thread;

mod error;

pub use error::QuillError;
pub use models::*;
pub use pager::{PageRequest, PageWindow};
pub use thread::{ReplyPlan, SequenceShift, ThreadKeys};
