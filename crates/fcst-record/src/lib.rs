//! Forecast Desk records
//!
//! Data model shared by every grid in the forecast desk.
//!
//! # Core Concepts
//!
//! - [`Scalar`]: Value held by one cell
//! - [`FieldSpec`]: Name, label, value kind and editability of a column
//! - [`EntitySchema`]: Fields, search fields, column groups and metrics of one
//!   kind of row
//! - [`Record`]: One keyed row
//! - [`EditPatch`]: Single-field change, the only way fields are mutated
//! - [`RecordStore`]: Ordered, key-unique rows owned by one grid
//!
//! # Example
//!
//! ```rust,ignore
//! use fcst_record::{entities, EditPatch, Record, RecordStore};
//! use std::sync::Arc;
//!
//! let schema = Arc::new(entities::pdt_forecast()?);
//! let mut store = RecordStore::from_records(
//!     schema,
//!     vec![Record::new("1").with("cnCategory", "Chargers")],
//! )?;
//! store.apply_patch(&EditPatch::new("1", "septemberForecast", 980_000.0))?;
//! ```

#![warn(unreachable_pub)]

pub mod entities;
mod error;
mod field;
mod record;
mod scalar;
mod schema;
mod store;

pub use error::{RecordError, SchemaError};
pub use field::{FieldKind, FieldName, FieldSpec, ValueKind};
pub use record::{EditPatch, PartialFields, Record, RecordKey};
pub use scalar::Scalar;
pub use schema::{ColumnGroup, EntitySchema, EntitySchemaBuilder, MetricKind, MetricSpec};
pub use store::{MergeReport, RecordStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
