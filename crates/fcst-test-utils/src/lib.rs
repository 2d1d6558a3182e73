//! Testing utilities for the Forecast Desk workspace
//!
//! Shared fixtures, recording collaborators and seeded data generators.

#![allow(missing_docs)]

mod fakes;
mod fixtures;
mod sinks;

pub use fakes::{JsonExporter, JsonImporter, MemorySource};
pub use fixtures::{
    random_pn_audit_rows, sample_row, sample_schema, scenario_records, scenario_store,
};
pub use sinks::{FailingSink, RecordingNotifier, RecordingSink};
