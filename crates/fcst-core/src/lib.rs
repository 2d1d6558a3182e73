//! Forecast Desk
//!
//! Workbench for sales-forecast entry and review grids.
//!
//! # Core Concepts
//!
//! - [`Workbench`]: one grid view with its store, filters, columns, pages and edits
//! - [`DeskConfig`]: TOML/YAML configuration with environment overrides
//! - [`RecordSource`], [`Exporter`], [`Importer`]: backend collaborators
//! - [`QuickEntry`]: code/region/quantity entry that upserts quick-entry rows
//! - [`assistant::reply`]: canned answers for the forecasting assistant
//!
//! # Example
//!
//! ```rust,ignore
//! use fcst_core::prelude::*;
//!
//! let config = DeskConfig::load("desk.toml")?;
//! fcst_core::logging::init(&config.log);
//!
//! let mut desk = Workbench::for_entity("pn_audit", records, &config, sink, notifier)?;
//! desk.set_search("A1263");
//! desk.edit("1", "auditCorrectedQuantity", "1,200")?;
//! let snapshot = desk.snapshot();
//! ```

#![warn(unreachable_pub)]

pub mod assistant;
mod collaborators;
mod config;
mod error;
pub mod logging;
pub mod quick_entry;
mod workbench;

pub use collaborators::{
    ExportArtifact, Exporter, ImportOutcome, Importer, ListParams, ListResponse, RecordSource,
    RowError,
};
pub use config::{ApiConfig, DeskConfig, LogConfig, PaginationConfig};
pub use error::{CollaboratorError, ConfigError, DeskError};
pub use quick_entry::{EntryMode, QuickEntry, QuickEntryOutcome, RegionTable};
pub use workbench::{GridSnapshot, ImportReport, Workbench};

pub mod prelude {
    //! Common imports for working with the workbench
    pub use crate::{
        DeskConfig, DeskError, EntryMode, GridSnapshot, QuickEntry, RegionTable, Workbench,
    };
    pub use fcst_edit::{CommitSink, EditMode, Notice, Notifier, TracingNotifier};
    pub use fcst_grid::{FilterCriteria, GroupState, PageInfo};
    pub use fcst_record::{entities, EditPatch, Record, RecordKey, Scalar};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
