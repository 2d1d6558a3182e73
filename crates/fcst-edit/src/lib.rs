//! Forecast Desk edits
//!
//! Single-cell editing for forecast grids.
//!
//! # Core Concepts
//!
//! - [`CellEditController`]: validates, normalizes and applies edits
//! - [`Debouncer`]: coalesces bursts of edits to one commit per cell
//! - [`CommitSink`]: persistence collaborator receiving partial updates
//! - [`Notifier`]: receives non-fatal notices such as failed commits
//!
//! # Example
//!
//! ```rust,ignore
//! use fcst_edit::{CellEditController, EditConfig, EditMode, TracingNotifier};
//!
//! let controller = CellEditController::from_config(
//!     EditConfig::new().with_mode(EditMode::Debounced),
//!     sink,
//!     Arc::new(TracingNotifier),
//! )?;
//! controller.edit(&mut store, "1", "augForecast", "1,200")?;
//! ```

#![warn(unreachable_pub)]

mod config;
mod controller;
mod debounce;
mod error;
mod sink;

pub use config::{EditConfig, EditMode};
pub use controller::{BatchOutcome, CellEditController, EditOutcome};
pub use debounce::{DebounceState, Debouncer, DEFAULT_WINDOW};
pub use error::EditError;
pub use sink::{
    CommitError, CommitSink, DiscardSink, Notice, NoticeLevel, Notifier, TracingNotifier,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
