//! Pagination windowing.
//!
//! Turns `(total_count, requested page, page size)` into the offset used to
//! slice a page of rows out of storage, plus the block of page-number links
//! a navigation bar shows (`[1][2][3][4][5]`, then `[6]..[10]`, ...).
//!
//! The whole computation is a pure function of its inputs. Callers build a
//! [`PageRequest`] from whatever the client sent (missing and nonsense
//! values are normalized, never rejected) and get back an immutable
//! [`PageWindow`]; computing the same window twice gives identical results.

use serde::{Deserialize, Serialize};

use crate::error::QuillError;

/// Number of page links shown per navigation block.
pub const BLOCK_SIZE: i64 = 5;

/// Rows per page when the client does not say otherwise.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Raw pagination parameters as they arrive from a client.
///
/// Both fields are optional; anything absent or below 1 falls back to the
/// defaults during [`PageWindow::compute`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    /// Requested page number, 1-based.
    pub page: Option<i64>,
    /// Requested rows per page.
    pub per_page: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }
}

/// A fully resolved pagination window.
///
/// All fields are plain values; nothing here is lazily defaulted or mutated
/// on read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageWindow {
    /// The page actually served, clamped into `[1, max(total_pages, 1)]`.
    pub page: i64,
    /// Rows per page after normalization.
    pub per_page: i64,
    /// Starting row index for the storage slice, `(page - 1) * per_page`.
    pub offset: i64,
    /// Total matching rows, as counted by storage.
    pub total_count: i64,
    /// Total pages; 0 exactly when `total_count` is 0.
    pub total_pages: i64,
    /// First page number of the current navigation block.
    pub block_start: i64,
    /// Last page number of the current navigation block.
    pub block_end: i64,
}

impl PageWindow {
    /// Resolve a window from a client request and the total row count.
    ///
    /// `total_count` comes from storage and must be non-negative; a negative
    /// value is a caller contract violation and is the only way this
    /// function fails.
    pub fn compute(request: &PageRequest, total_count: i64) -> Result<Self, QuillError> {
        if total_count < 0 {
            return Err(QuillError::InvalidArgument(format!(
                "total_count must be non-negative, got {total_count}"
            )));
        }

        let per_page = match request.per_page {
            Some(n) if n >= 1 => n,
            _ => DEFAULT_PER_PAGE,
        };
        let requested = match request.page {
            Some(n) if n >= 1 => n,
            _ => 1,
        };

        let total_pages = ceil_div(total_count, per_page);

        // Requests past the end land on the last page. When the board is
        // empty there is no last page; page 1 is served with no rows.
        let page = requested.min(total_pages.max(1));

        let cur_block = ceil_div(page, BLOCK_SIZE);
        let total_blocks = ceil_div(total_pages, BLOCK_SIZE);

        let block_start = (cur_block - 1) * BLOCK_SIZE + 1;
        let mut block_end = cur_block * BLOCK_SIZE;
        if cur_block >= total_blocks {
            // Last block ends at the last real page; an empty board still
            // shows page 1.
            block_end = total_pages.max(1);
        }

        Ok(Self {
            page,
            per_page,
            offset: (page - 1) * per_page,
            total_count,
            total_pages,
            block_start,
            block_end,
        })
    }

    /// Whether a page after this one exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether a page before this one exists.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

fn ceil_div(n: i64, d: i64) -> i64 {
    (n + d - 1) / d
}
