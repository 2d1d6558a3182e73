//! Collaborator contracts
//!
//! The workbench never talks to a transport or parses files itself. It
//! builds [`ListParams`] for a list fetch, hands visible rows to an
//! [`Exporter`], and merges whatever an [`Importer`] returns.

use crate::error::CollaboratorError;
use fcst_grid::{FilterCriteria, PageSlice, Pagination};
use fcst_record::{EntitySchema, FieldName, Record};
use serde::{Deserialize, Serialize};

/// Query parameters for a collaborator list fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// 1-indexed page
    pub page: usize,
    /// Page size
    pub size: usize,
    /// Free-text search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// PDT filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdt: Option<String>,
    /// Channel filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Product status filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_status: Option<String>,
    /// Singularity segment filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singularity_segment: Option<String>,
    /// Range start, as entered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Range end, as entered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl ListParams {
    /// Build parameters from the current view state
    #[must_use]
    pub fn from_view(criteria: &FilterCriteria, pagination: &Pagination) -> Self {
        let field = |name: &str| {
            criteria
                .field(name)
                .filter(|v| !v.is_blank())
                .map(ToString::to_string)
        };
        Self {
            page: pagination.page(),
            size: pagination.size(),
            search: criteria.search_term().map(str::to_string),
            pdt: field("pdt"),
            channel: field("channel"),
            product_status: field("productStatus"),
            singularity_segment: field("singularitySegment"),
            start_date: field("startDate"),
            end_date: field("endDate"),
        }
    }

    /// Set the date range
    #[must_use]
    pub fn with_dates(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self.end_date = Some(end.into());
        self
    }

    /// Key/value pairs for a query string, absent values omitted
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("page", self.page.to_string()), ("size", self.size.to_string())];
        let optional = [
            ("search", &self.search),
            ("pdt", &self.pdt),
            ("channel", &self.channel),
            ("productStatus", &self.product_status),
            ("singularitySegment", &self.singularity_segment),
            ("startDate", &self.start_date),
            ("endDate", &self.end_date),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                query.push((name, value.clone()));
            }
        }
        query
    }
}

/// Paged list payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Rows across all pages
    pub total: usize,
    /// 1-indexed page
    pub page: usize,
    /// Page size
    pub size: usize,
    /// Page count
    pub pages: usize,
}

impl<T> From<PageSlice<T>> for ListResponse<T> {
    fn from(slice: PageSlice<T>) -> Self {
        Self {
            items: slice.items,
            total: slice.total,
            page: slice.page,
            size: slice.size,
            pages: slice.pages,
        }
    }
}

impl ListResponse<serde_json::Value> {
    /// Decode JSON rows against a schema, keeping per-row errors
    #[must_use]
    pub fn into_records(self, schema: &EntitySchema) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        for (row, item) in self.items.into_iter().enumerate() {
            match Record::from_json(schema, item) {
                Ok(record) => outcome.records.push(record),
                Err(e) => outcome.errors.push(RowError::new(row, e.to_string())),
            }
        }
        outcome
    }
}

/// Problem with one imported or fetched row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 0-indexed row in the source
    pub row: usize,
    /// What was wrong
    pub message: String,
}

impl RowError {
    /// Create a row error
    #[inline]
    #[must_use]
    pub fn new(row: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            message: message.into(),
        }
    }
}

/// Parsed import: usable records plus the rows that failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    /// Records to merge
    pub records: Vec<Record>,
    /// Rows that could not be read
    pub errors: Vec<RowError>,
}

/// Opaque downloadable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// File content
    pub bytes: Vec<u8>,
}

/// Source of paged rows, such as a REST list endpoint
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of raw rows for an entity
    async fn list(
        &self,
        entity: &str,
        params: &ListParams,
    ) -> Result<ListResponse<serde_json::Value>, CollaboratorError>;
}

/// Renders rows to a downloadable file
#[async_trait::async_trait]
pub trait Exporter: Send + Sync {
    /// Export `records`, restricted to `fields` in the given order
    async fn export(
        &self,
        records: &[&Record],
        fields: &[FieldName],
    ) -> Result<ExportArtifact, CollaboratorError>;
}

/// Parses an uploaded file into records
#[async_trait::async_trait]
pub trait Importer: Send + Sync {
    /// Parse `blob` against `schema`
    async fn import(
        &self,
        schema: &EntitySchema,
        blob: &[u8],
    ) -> Result<ImportOutcome, CollaboratorError>;
}
