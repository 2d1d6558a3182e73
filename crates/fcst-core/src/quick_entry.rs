//! Fast entry by PN or SKU
//!
//! A quick entry names a product code, a region and a quantity. The sales
//! owner follows from the region. An entry either replaces the quantity of
//! the row with the same code, region and owner (`Refresh`) or adds to it
//! (`Accumulate`); with no such row, a new one is appended.

use crate::error::DeskError;
use fcst_edit::{CellEditController, EditOutcome};
use fcst_record::{entities, EntitySchema, FieldName, Record, RecordKey, RecordStore, Scalar};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Region column
pub const REGION_FIELD: &str = "region";
/// Sales owner column
pub const OWNER_FIELD: &str = "salesPerson";
/// Quantity column
pub const QUANTITY_FIELD: &str = "quantity";
/// New-row marker column
pub const NEW_FIELD: &str = "isNew";

/// How a quick entry treats an existing row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// Replace the quantity
    #[default]
    Refresh,
    /// Add to the quantity
    Accumulate,
}

/// One quick-entry submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickEntry {
    /// PN or SKU code
    pub code: String,
    /// Sales region
    pub region: String,
    /// Quantity entered
    pub quantity: f64,
    /// Replace or accumulate
    #[serde(default)]
    pub mode: EntryMode,
}

impl QuickEntry {
    /// Create a refresh-mode entry
    #[must_use]
    pub fn new(code: impl Into<String>, region: impl Into<String>, quantity: f64) -> Self {
        Self {
            code: code.into(),
            region: region.into(),
            quantity,
            mode: EntryMode::Refresh,
        }
    }

    /// Set the mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: EntryMode) -> Self {
        self.mode = mode;
        self
    }
}

/// What a quick entry did
#[derive(Debug, Clone, PartialEq)]
pub enum QuickEntryOutcome {
    /// Existing row's quantity replaced
    Replaced(EditOutcome),
    /// Quantity added to an existing row
    Accumulated(EditOutcome),
    /// New row appended
    Added(EditOutcome),
}

impl QuickEntryOutcome {
    /// Key of the affected row
    #[must_use]
    pub fn key(&self) -> &RecordKey {
        match self {
            Self::Replaced(o) | Self::Accumulated(o) | Self::Added(o) => &o.key,
        }
    }
}

/// Region to sales-owner assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionTable {
    /// Owner per region
    pub owners: IndexMap<String, String>,
    /// Owner for regions not in the table
    pub default_owner: String,
}

impl Default for RegionTable {
    fn default() -> Self {
        let owners = [
            ("华东区", "张三"),
            ("华南区", "李四"),
            ("华北区", "王五"),
            ("华中区", "王五"),
        ]
        .into_iter()
        .map(|(r, o)| (r.to_string(), o.to_string()))
        .collect();
        Self {
            owners,
            default_owner: "张三".to_string(),
        }
    }
}

impl RegionTable {
    /// Sales owner for a region
    #[must_use]
    pub fn owner_for(&self, region: &str) -> &str {
        self.owners
            .get(region)
            .map_or(self.default_owner.as_str(), String::as_str)
    }

    /// Known regions in table order
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.owners.keys().map(String::as_str)
    }
}

/// Code column of a quick-entry schema, or `None` if the schema lacks the
/// quick-entry columns
#[must_use]
pub fn code_field(schema: &EntitySchema) -> Option<&'static str> {
    let has = |f: &str| schema.contains(f);
    if !(has(REGION_FIELD) && has(OWNER_FIELD) && has(QUANTITY_FIELD)) {
        return None;
    }
    [entities::PN_CODE_FIELD, entities::SKU_CODE_FIELD]
        .into_iter()
        .find(|f| has(*f))
}

/// Apply a quick entry to `store`.
///
/// Quantities go through `editor`, so the floor applies and debounced
/// commits are scheduled as for any cell edit.
///
/// # Errors
/// - `DeskError::NotQuickEntry` if the schema lacks the quick-entry columns
/// - `DeskError::BlankCode` if the code is empty after trimming
/// - Any edit or record error from the underlying operations. A refused
///   quantity leaves the store unchanged, including for new rows.
pub fn apply(
    store: &mut RecordStore,
    editor: &CellEditController,
    regions: &RegionTable,
    entry: &QuickEntry,
) -> Result<QuickEntryOutcome, DeskError> {
    let schema = store.schema().clone();
    let code_field =
        code_field(&schema).ok_or_else(|| DeskError::NotQuickEntry(schema.name().to_string()))?;
    let owner = regions.owner_for(&entry.region).to_string();

    let code = entry.code.trim();
    if code.is_empty() {
        return Err(DeskError::BlankCode);
    }
    let code = Scalar::text(code);
    let region = Scalar::text(entry.region.as_str());
    let owner_value = Scalar::text(owner.as_str());
    let existing = store
        .find_by(&[
            (code_field, &code),
            (REGION_FIELD, &region),
            (OWNER_FIELD, &owner_value),
        ])
        .map(|r| (r.key().clone(), r.number(QUANTITY_FIELD)));

    let outcome = match (existing, entry.mode) {
        (Some((key, _)), EntryMode::Refresh) => QuickEntryOutcome::Replaced(editor.edit(
            store,
            key.as_str(),
            QUANTITY_FIELD,
            entry.quantity,
        )?),
        (Some((key, current)), EntryMode::Accumulate) => {
            QuickEntryOutcome::Accumulated(editor.edit(
                store,
                key.as_str(),
                QUANTITY_FIELD,
                current + entry.quantity,
            )?)
        }
        (None, _) => {
            let (quantity, clamped) =
                editor.prepare(&schema, QUANTITY_FIELD, Scalar::Number(entry.quantity))?;
            let key = RecordKey::new(ulid::Ulid::new().to_string());
            let mut record = Record::new(key.clone())
                .with(code_field, code)
                .with(REGION_FIELD, region)
                .with(OWNER_FIELD, owner_value)
                .with(QUANTITY_FIELD, quantity.clone());
            if schema.contains(NEW_FIELD) {
                record = record.with(NEW_FIELD, true);
            }
            editor.create(store, record)?;
            QuickEntryOutcome::Added(EditOutcome {
                key,
                field: FieldName::from(QUANTITY_FIELD),
                previous: Scalar::Null,
                value: quantity,
                clamped,
            })
        }
    };

    tracing::debug!(
        entity = schema.name(),
        code = %entry.code,
        region = %entry.region,
        owner = %owner,
        key = %outcome.key(),
        "applied quick entry"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcst_edit::{EditConfig, EditError};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn store() -> RecordStore {
        let schema = Arc::new(entities::pn_quick_entry().unwrap());
        RecordStore::from_records(
            schema,
            vec![Record::new("1")
                .with("pn", "A2637")
                .with("region", "华东区")
                .with("salesPerson", "张三")
                .with("quantity", 100.0)],
        )
        .unwrap()
    }

    fn editor() -> CellEditController {
        CellEditController::immediate(EditConfig::default())
    }

    #[test]
    fn owner_lookup_falls_back_to_default() {
        let table = RegionTable::default();
        assert_eq!(table.owner_for("华南区"), "李四");
        assert_eq!(table.owner_for("华中区"), "王五");
        assert_eq!(table.owner_for("西北区"), "张三");
    }

    #[test]
    fn refresh_replaces_matching_row() {
        let mut store = store();
        let outcome = apply(
            &mut store,
            &editor(),
            &RegionTable::default(),
            &QuickEntry::new("A2637", "华东区", 40.0),
        )
        .unwrap();
        assert!(matches!(outcome, QuickEntryOutcome::Replaced(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().number("quantity"), 40.0);
    }

    #[test]
    fn accumulate_adds_to_matching_row() {
        let mut store = store();
        apply(
            &mut store,
            &editor(),
            &RegionTable::default(),
            &QuickEntry::new("A2637", "华东区", 40.0).with_mode(EntryMode::Accumulate),
        )
        .unwrap();
        assert_eq!(store.get("1").unwrap().number("quantity"), 140.0);
    }

    #[test]
    fn unmatched_entry_appends_new_row() {
        let mut store = store();
        let outcome = apply(
            &mut store,
            &editor(),
            &RegionTable::default(),
            &QuickEntry::new("A2637", "华南区", 25.0).with_mode(EntryMode::Accumulate),
        )
        .unwrap();
        assert!(matches!(outcome, QuickEntryOutcome::Added(_)));
        assert_eq!(store.len(), 2);

        let added = store.get(outcome.key().as_str()).unwrap();
        assert_eq!(added.value("salesPerson"), &Scalar::text("李四"));
        assert_eq!(added.value("isNew"), &Scalar::Bool(true));
        assert_eq!(added.number("quantity"), 25.0);
    }

    #[test]
    fn negative_quantity_clamped() {
        let mut store = store();
        apply(
            &mut store,
            &editor(),
            &RegionTable::default(),
            &QuickEntry::new("A2637", "华东区", -10.0),
        )
        .unwrap();
        assert_eq!(store.get("1").unwrap().number("quantity"), 0.0);
    }

    #[test]
    fn new_row_with_invalid_quantity_is_not_added() {
        let mut store = store();
        let revision = store.revision();
        let err = apply(
            &mut store,
            &editor(),
            &RegionTable::default(),
            &QuickEntry::new("A2637", "华南区", f64::NAN),
        )
        .unwrap_err();
        assert!(matches!(err, DeskError::Edit(EditError::InvalidNumber { .. })));
        assert!(err.is_user_error());
        assert_eq!(store.len(), 1);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn new_row_with_negative_quantity_starts_at_floor() {
        let mut store = store();
        let outcome = apply(
            &mut store,
            &editor(),
            &RegionTable::default(),
            &QuickEntry::new("B1001", "华东区", -3.0),
        )
        .unwrap();
        let QuickEntryOutcome::Added(added) = &outcome else {
            panic!("expected a new row, got {outcome:?}");
        };
        assert!(added.clamped);
        assert_eq!(added.previous, Scalar::Null);
        assert_eq!(store.get(outcome.key().as_str()).unwrap().number("quantity"), 0.0);
    }

    #[test]
    fn blank_code_rejected() {
        let mut store = store();
        for code in ["", "   "] {
            let err = apply(
                &mut store,
                &editor(),
                &RegionTable::default(),
                &QuickEntry::new(code, "华东区", 5.0),
            )
            .unwrap_err();
            assert!(matches!(err, DeskError::BlankCode));
            assert!(err.is_user_error());
        }
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn non_quick_entry_schema_rejected() {
        let schema = Arc::new(entities::pdt_forecast().unwrap());
        let mut store = RecordStore::new(schema);
        let err = apply(
            &mut store,
            &editor(),
            &RegionTable::default(),
            &QuickEntry::new("x", "华东区", 1.0),
        )
        .unwrap_err();
        assert!(matches!(err, DeskError::NotQuickEntry(_)));
    }

    #[test]
    fn code_field_per_schema() {
        assert_eq!(code_field(&entities::pn_quick_entry().unwrap()), Some("pn"));
        assert_eq!(code_field(&entities::sku_quick_entry().unwrap()), Some("sku"));
        assert_eq!(code_field(&entities::pn_data().unwrap()), None);
    }
}
