//! Per-view grid session
//!
//! A [`Workbench`] owns the record store of one view and the view state
//! around it: filter criteria, visible columns, pagination, the edit
//! controller and the detail cursor. Rows flow
//! store → filter → (summary, page) → [`GridSnapshot`]; every edit goes
//! back into the store through the edit controller.

use crate::collaborators::{
    ExportArtifact, Exporter, Importer, ListParams, ListResponse, RecordSource, RowError,
};
use crate::config::DeskConfig;
use crate::error::DeskError;
use crate::quick_entry::{self, QuickEntry, QuickEntryOutcome, RegionTable};
use fcst_edit::{
    BatchOutcome, CellEditController, CommitSink, DebounceState, EditMode, EditOutcome, Notifier,
};
use fcst_grid::{
    summarize, ColumnController, ColumnSet, DetailCursor, FilterCriteria, FilterEngine,
    GroupState, PageInfo, PageSlice, Pagination, Summary,
};
use fcst_record::{
    entities, EditPatch, EntitySchema, FieldName, FieldSpec, MergeReport, Record, RecordStore,
    Scalar,
};
use serde::Serialize;
use std::sync::Arc;
use ulid::Ulid;

/// Everything needed to render the grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    /// Entity name
    pub entity: String,
    /// Rows on the current page
    pub rows: Vec<Record>,
    /// Visible columns in schema order
    pub columns: Vec<FieldName>,
    /// Metrics over every visible row, not just this page
    pub summary: Summary,
    /// Page position
    pub page: PageInfo,
}

/// Result of [`Workbench::import`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Store merge result
    pub merge: MergeReport,
    /// Rows the importer could not read
    pub row_errors: Vec<RowError>,
}

/// Grid session for one view
#[derive(Debug)]
pub struct Workbench {
    id: Ulid,
    store: RecordStore,
    filter: FilterEngine,
    criteria: FilterCriteria,
    columns: ColumnController,
    visible_columns: ColumnSet,
    pagination: Pagination,
    editor: CellEditController,
    regions: RegionTable,
    cursor: Option<DetailCursor>,
}

impl Workbench {
    /// Create a session over an initial batch of records
    ///
    /// # Errors
    /// - `DeskError::Record` for duplicate keys or invalid records
    /// - `DeskError::Pagination` or `DeskError::Edit` for bad configuration
    pub fn new(
        schema: Arc<EntitySchema>,
        records: Vec<Record>,
        config: &DeskConfig,
        sink: Arc<dyn CommitSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, DeskError> {
        let store = RecordStore::from_records(Arc::clone(&schema), records)?;
        let editor = CellEditController::from_config(config.edit.clone(), sink, notifier)?;
        let pagination = config.pagination.build()?;
        let columns = ColumnController::new(Arc::clone(&schema));
        let visible_columns = columns.reset();

        let workbench = Self {
            id: Ulid::new(),
            store,
            filter: FilterEngine::new(schema),
            criteria: FilterCriteria::new(),
            columns,
            visible_columns,
            pagination,
            editor,
            regions: config.regions.clone(),
            cursor: None,
        };
        tracing::info!(
            session = %workbench.id,
            entity = workbench.schema().name(),
            rows = workbench.store.len(),
            mode = ?workbench.editor.mode(),
            "workbench opened"
        );
        Ok(workbench)
    }

    /// Create a session for a built-in entity
    ///
    /// # Errors
    /// `DeskError::UnknownEntity` for names outside the catalog, plus any
    /// error from [`Workbench::new`].
    pub fn for_entity(
        entity: &str,
        records: Vec<Record>,
        config: &DeskConfig,
        sink: Arc<dyn CommitSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, DeskError> {
        let schema = entities::by_name(entity)?
            .ok_or_else(|| DeskError::UnknownEntity(entity.to_string()))?;
        Self::new(schema, records, config, sink, notifier)
    }

    /// Create a session from a list payload, returning rows that failed to
    /// decode
    ///
    /// # Errors
    /// Same as [`Workbench::new`].
    pub fn load(
        schema: Arc<EntitySchema>,
        response: ListResponse<serde_json::Value>,
        config: &DeskConfig,
        sink: Arc<dyn CommitSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<(Self, Vec<RowError>), DeskError> {
        let outcome = response.into_records(&schema);
        if !outcome.errors.is_empty() {
            tracing::warn!(
                entity = schema.name(),
                rejected = outcome.errors.len(),
                "skipped undecodable rows"
            );
        }
        let workbench = Self::new(schema, outcome.records, config, sink, notifier)?;
        Ok((workbench, outcome.errors))
    }

    /// Session identifier, for logs
    #[inline]
    #[must_use]
    pub fn id(&self) -> Ulid {
        self.id
    }

    /// Entity schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<EntitySchema> {
        self.store.schema()
    }

    /// Record store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Edit controller
    #[inline]
    #[must_use]
    pub fn editor(&self) -> &CellEditController {
        &self.editor
    }

    // Filtering

    /// Current criteria
    #[inline]
    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Replace the search term
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.criteria.set_search(term);
        self.refresh_cursor();
    }

    /// Set or clear (with a blank value) a field filter
    pub fn set_filter(&mut self, field: impl Into<FieldName>, value: impl Into<Scalar>) {
        self.criteria.set_field(field, value);
        self.refresh_cursor();
    }

    /// Drop every filter and the search term
    pub fn clear_filters(&mut self) {
        self.criteria.clear();
        self.refresh_cursor();
    }

    /// Rows passing the current criteria, in store order
    #[must_use]
    pub fn visible(&self) -> Vec<&Record> {
        self.filter.apply(self.store.iter(), &self.criteria)
    }

    /// Metrics over the visible rows
    #[must_use]
    pub fn summary(&self) -> Summary {
        summarize(self.schema().metrics(), &self.visible())
    }

    // Pagination

    /// Pagination state
    #[inline]
    #[must_use]
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Jump to a page
    pub fn set_page(&mut self, page: usize) {
        self.pagination.set_page(page);
    }

    /// Change the page size, returning to page 1
    ///
    /// # Errors
    /// `DeskError::Pagination` for sizes outside the allowed set.
    pub fn set_page_size(&mut self, size: usize) -> Result<(), DeskError> {
        self.pagination.set_page_size(size)?;
        Ok(())
    }

    /// Current page of visible rows
    #[must_use]
    pub fn current_page(&self) -> PageSlice<&Record> {
        self.pagination.slice(&self.visible())
    }

    // Columns

    /// Visible column set
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.visible_columns
    }

    /// Show or hide one column
    pub fn toggle_column(&mut self, field: &str, visible: bool) {
        self.visible_columns = self.columns.toggle(&self.visible_columns, field, visible);
    }

    /// Show or hide a column group
    pub fn toggle_group(&mut self, group: &str, visible: bool) {
        self.visible_columns = self
            .columns
            .toggle_group(&self.visible_columns, group, visible);
    }

    /// Back to the default columns
    pub fn reset_columns(&mut self) {
        self.visible_columns = self.columns.reset();
    }

    /// Show every grouped column
    pub fn select_all_columns(&mut self) {
        self.visible_columns = self.columns.select_all();
    }

    /// Selection state of a group
    #[must_use]
    pub fn group_state(&self, group: &str) -> Option<GroupState> {
        self.columns.group_state(&self.visible_columns, group)
    }

    /// Visible columns in schema order
    #[must_use]
    pub fn visible_fields(&self) -> Vec<&FieldSpec> {
        self.columns.ordered(&self.visible_columns)
    }

    // Editing

    /// Edit one cell
    ///
    /// # Errors
    /// `DeskError::Edit` if the edit is refused; the store is unchanged.
    pub fn edit(
        &mut self,
        key: &str,
        field: &str,
        value: impl Into<Scalar>,
    ) -> Result<EditOutcome, DeskError> {
        let outcome = self.editor.edit(&mut self.store, key, field, value)?;
        self.refresh_cursor();
        Ok(outcome)
    }

    /// Apply many edits
    pub fn batch_edit(&mut self, patches: impl IntoIterator<Item = EditPatch>) -> BatchOutcome {
        let outcome = self.editor.batch_edit(&mut self.store, patches);
        self.refresh_cursor();
        outcome
    }

    /// Commit every pending edit now
    ///
    /// # Errors
    /// `DeskError::Commit` if the sink fails; local values are kept.
    pub async fn flush(&self) -> Result<usize, DeskError> {
        Ok(self.editor.flush().await?)
    }

    /// Drop the pending commit of one cell
    pub fn cancel_edit(&self, key: &str, field: &str) -> Option<Scalar> {
        self.editor.cancel(key, field)
    }

    /// Commit state of one cell
    #[must_use]
    pub fn edit_state(&self, key: &str, field: &str) -> DebounceState {
        self.editor.state(key, field)
    }

    /// Commit mode
    #[inline]
    #[must_use]
    pub fn edit_mode(&self) -> EditMode {
        self.editor.mode()
    }

    // Rows

    /// Append a row; in debounced mode it is also sent to the commit sink
    ///
    /// # Errors
    /// `DeskError::Edit` wrapping the store's refusal, for duplicate keys or
    /// invalid fields.
    pub fn add_record(&mut self, record: Record) -> Result<(), DeskError> {
        self.editor.create(&mut self.store, record)?;
        self.refresh_cursor();
        Ok(())
    }

    /// Delete a row; in debounced mode the deletion is also sent to the
    /// commit sink
    ///
    /// # Errors
    /// `DeskError::Edit` if the key is absent.
    pub fn remove_record(&mut self, key: &str) -> Result<Record, DeskError> {
        let record = self.editor.delete(&mut self.store, key)?;
        self.refresh_cursor();
        Ok(record)
    }

    /// Apply a quick entry
    ///
    /// # Errors
    /// `DeskError::NotQuickEntry` for entities without quick-entry columns,
    /// or any edit error.
    pub fn quick_entry(&mut self, entry: &QuickEntry) -> Result<QuickEntryOutcome, DeskError> {
        let outcome = quick_entry::apply(&mut self.store, &self.editor, &self.regions, entry)?;
        self.refresh_cursor();
        Ok(outcome)
    }

    // Detail dialog

    /// Open the detail view on a visible row
    pub fn open_detail(&mut self, index: usize) -> Option<&Record> {
        self.cursor = DetailCursor::open(index, self.visible().len());
        self.detail()
    }

    /// Row shown in the detail view
    #[must_use]
    pub fn detail(&self) -> Option<&Record> {
        let cursor = self.cursor?;
        let visible = self.visible();
        cursor.current(&visible).copied()
    }

    /// Move the detail view to the next visible row
    pub fn next_detail(&mut self) -> Option<&Record> {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.next_row();
        }
        self.detail()
    }

    /// Move the detail view to the previous visible row
    pub fn prev_detail(&mut self) -> Option<&Record> {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.prev_row();
        }
        self.detail()
    }

    /// Close the detail view
    pub fn close_detail(&mut self) {
        self.cursor = None;
    }

    fn refresh_cursor(&mut self) {
        if let Some(cursor) = self.cursor {
            self.cursor = cursor.resize(self.visible().len());
        }
    }

    // Collaborators

    /// Parameters for a collaborator list fetch matching the view
    #[must_use]
    pub fn list_params(&self) -> ListParams {
        ListParams::from_view(&self.criteria, &self.pagination)
    }

    /// Replace the store with a freshly fetched page, returning rows that
    /// failed to decode
    ///
    /// # Errors
    /// `DeskError::Collaborator` if the fetch fails, or `DeskError::Record`
    /// if the payload repeats a key. The store is unchanged on error.
    pub async fn fetch(&mut self, source: &dyn RecordSource) -> Result<Vec<RowError>, DeskError> {
        let schema = Arc::clone(self.schema());
        let params = self.list_params();
        let response = source.list(schema.name(), &params).await?;
        let outcome = response.into_records(&schema);
        self.store = RecordStore::from_records(Arc::clone(&schema), outcome.records)?;
        self.cursor = None;
        tracing::info!(
            session = %self.id,
            entity = schema.name(),
            rows = self.store.len(),
            rejected = outcome.errors.len(),
            "fetched records"
        );
        Ok(outcome.errors)
    }

    /// Export the visible rows with the visible columns
    ///
    /// # Errors
    /// `DeskError::Collaborator` if the exporter fails.
    pub async fn export(&self, exporter: &dyn Exporter) -> Result<ExportArtifact, DeskError> {
        let rows = self.visible();
        let fields: Vec<FieldName> = self
            .visible_fields()
            .into_iter()
            .map(|spec| spec.name.clone())
            .collect();
        let artifact = exporter.export(&rows, &fields).await?;
        tracing::info!(
            session = %self.id,
            rows = rows.len(),
            columns = fields.len(),
            file = %artifact.file_name,
            "exported records"
        );
        Ok(artifact)
    }

    /// Parse an uploaded file and upsert its records by key
    ///
    /// # Errors
    /// `DeskError::Collaborator` if the importer fails outright. Bad rows
    /// are reported in the result instead.
    pub async fn import(
        &mut self,
        importer: &dyn Importer,
        blob: &[u8],
    ) -> Result<ImportReport, DeskError> {
        let schema = Arc::clone(self.schema());
        let outcome = importer.import(&schema, blob).await?;
        let merge = self.store.merge(outcome.records);
        self.refresh_cursor();
        tracing::info!(
            session = %self.id,
            inserted = merge.inserted.len(),
            updated = merge.updated.len(),
            rejected = merge.rejected.len(),
            row_errors = outcome.errors.len(),
            "imported records"
        );
        Ok(ImportReport {
            merge,
            row_errors: outcome.errors,
        })
    }

    /// Render state for the current page
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        let visible = self.visible();
        let summary = summarize(self.schema().metrics(), &visible);
        let page = self.pagination.slice(&visible);
        GridSnapshot {
            entity: self.schema().name().to_string(),
            rows: page.items.iter().map(|r| (*r).clone()).collect(),
            columns: self
                .visible_fields()
                .into_iter()
                .map(|spec| spec.name.clone())
                .collect(),
            summary,
            page: page.info(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcst_edit::{DiscardSink, TracingNotifier};
    use pretty_assertions::assert_eq;

    fn workbench() -> Workbench {
        let records = (1..=3u32)
            .map(|i| {
                Record::new(i.to_string())
                    .with("cnCategory", format!("Category {i}"))
                    .with("septemberForecast", f64::from(i) * 100.0)
            })
            .collect();
        Workbench::for_entity(
            "pdt_forecast",
            records,
            &DeskConfig::default(),
            Arc::new(DiscardSink),
            Arc::new(TracingNotifier),
        )
        .unwrap()
    }

    #[test]
    fn unknown_entity_rejected() {
        let err = Workbench::for_entity(
            "nope",
            Vec::new(),
            &DeskConfig::default(),
            Arc::new(DiscardSink),
            Arc::new(TracingNotifier),
        )
        .unwrap_err();
        assert!(matches!(err, DeskError::UnknownEntity(_)));
    }

    #[test]
    fn detail_cursor_follows_filter() {
        let mut wb = workbench();
        assert_eq!(wb.open_detail(2).map(|r| r.key().to_string()), Some("3".into()));
        wb.set_search("category 1");
        assert_eq!(wb.detail().map(|r| r.key().to_string()), Some("1".into()));
        assert!(wb.next_detail().is_some());
        wb.set_search("nothing matches");
        assert!(wb.detail().is_none());
    }

    #[test]
    fn snapshot_uses_visible_columns_in_schema_order() {
        let mut wb = workbench();
        wb.reset_columns();
        wb.toggle_column("q4TotalAmount", true);
        wb.toggle_column("cnCategory", false);
        let snapshot = wb.snapshot();
        assert_eq!(snapshot.entity, "pdt_forecast");
        assert_eq!(snapshot.columns.first().map(FieldName::as_str), Some("septemberForecast"));
        assert_eq!(snapshot.columns.last().map(FieldName::as_str), Some("q4TotalAmount"));
        assert_eq!(snapshot.page.total, 3);
    }

    #[test]
    fn rejected_page_size_keeps_state() {
        let mut wb = workbench();
        assert!(matches!(wb.set_page_size(3), Err(DeskError::Pagination(_))));
        assert_eq!(wb.pagination().size(), 10);
    }
}
