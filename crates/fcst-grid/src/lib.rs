//! Forecast Desk grid
//!
//! Pure view-state operations over a record sequence:
//! - [`FilterEngine`]: search and field constraints
//! - [`ColumnController`]: column visibility with group toggles
//! - [`summarize`]: summary-bar metrics
//! - [`page`] and [`Pagination`]: page slicing with an allowed size set
//! - [`DetailCursor`]: stepping through rows in the detail dialog
//!
//! None of these mutate records. Rows flow
//! store → filter → (summary, page) → rendered rows.

#![warn(unreachable_pub)]

pub mod aggregate;
pub mod columns;
pub mod cursor;
pub mod filter;
pub mod pagination;

pub use aggregate::{evaluate, group_counts, summarize, Summary};
pub use columns::{ColumnController, ColumnSet, GroupState};
pub use cursor::DetailCursor;
pub use filter::{FilterCriteria, FilterEngine};
pub use pagination::{page, PageInfo, PageSlice, Pagination, PaginationError, DEFAULT_PAGE_SIZES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
