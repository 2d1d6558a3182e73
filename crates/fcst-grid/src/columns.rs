//! Column visibility
//!
//! [`ColumnSet`] is a plain set of visible field names with idempotent
//! toggles. [`ColumnController`] binds those operations to a schema so that
//! unknown fields are ignored and groups, resets and ordering follow the
//! schema's column layout. Neither ever touches record data.

use fcst_record::{ColumnGroup, EntitySchema, FieldName, FieldSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Set of visible columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSet(BTreeSet<FieldName>);

impl ColumnSet {
    /// Create an empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show or hide one column
    #[must_use]
    pub fn toggle(&self, field: &str, visible: bool) -> Self {
        let mut next = self.clone();
        if visible {
            next.0.insert(FieldName::from(field));
        } else {
            next.0.remove(field);
        }
        next
    }

    /// Show or hide every column of a group
    #[must_use]
    pub fn toggle_group(&self, group: &ColumnGroup, visible: bool) -> Self {
        let mut next = self.clone();
        for field in &group.fields {
            if visible {
                next.0.insert(field.clone());
            } else {
                next.0.remove(field);
            }
        }
        next
    }

    /// Check visibility
    #[inline]
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    /// Number of visible columns
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check for no visible columns
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Visible columns in name order
    pub fn iter(&self) -> impl Iterator<Item = &FieldName> {
        self.0.iter()
    }
}

impl<F: Into<FieldName>> FromIterator<F> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Selection state of a column group, for a "select all in group" checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupState {
    /// Every member visible
    All,
    /// Some members visible
    Partial,
    /// No member visible
    None,
}

/// Schema-aware column operations
#[derive(Debug, Clone)]
pub struct ColumnController {
    schema: Arc<EntitySchema>,
}

impl ColumnController {
    /// Create a controller for a schema
    #[inline]
    #[must_use]
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self { schema }
    }

    /// Show or hide a column. Fields the schema does not know are ignored.
    #[must_use]
    pub fn toggle(&self, current: &ColumnSet, field: &str, visible: bool) -> ColumnSet {
        if !self.schema.contains(field) {
            tracing::debug!(entity = self.schema.name(), field, "ignoring unknown column");
            return current.clone();
        }
        current.toggle(field, visible)
    }

    /// Show or hide a named group. Unknown groups are ignored.
    #[must_use]
    pub fn toggle_group(&self, current: &ColumnSet, group: &str, visible: bool) -> ColumnSet {
        match self.schema.column_group(group) {
            Some(group) => current.toggle_group(group, visible),
            None => {
                tracing::debug!(entity = self.schema.name(), group, "ignoring unknown column group");
                current.clone()
            }
        }
    }

    /// The schema's default columns
    #[must_use]
    pub fn reset(&self) -> ColumnSet {
        self.schema.default_columns().iter().collect()
    }

    /// Union of every column group, or every field when the schema has none
    #[must_use]
    pub fn select_all(&self) -> ColumnSet {
        if self.schema.column_groups().is_empty() {
            return self.schema.field_names().collect();
        }
        self.schema
            .column_groups()
            .iter()
            .flat_map(|g| g.fields.iter())
            .collect()
    }

    /// How much of a group is visible; `None` for unknown groups
    #[must_use]
    pub fn group_state(&self, current: &ColumnSet, group: &str) -> Option<GroupState> {
        let group = self.schema.column_group(group)?;
        let visible = group.fields.iter().filter(|f| current.contains(f.as_str())).count();
        Some(if visible == 0 {
            GroupState::None
        } else if visible == group.fields.len() {
            GroupState::All
        } else {
            GroupState::Partial
        })
    }

    /// Drop columns the schema no longer declares
    #[must_use]
    pub fn retain_known(&self, current: &ColumnSet) -> ColumnSet {
        current
            .iter()
            .filter(|f| self.schema.contains(f.as_str()))
            .collect()
    }

    /// Visible fields in schema order
    #[must_use]
    pub fn ordered(&self, current: &ColumnSet) -> Vec<&FieldSpec> {
        self.schema
            .fields()
            .filter(|spec| current.contains(spec.name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcst_record::entities;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn controller() -> ColumnController {
        ColumnController::new(Arc::new(entities::pn_audit().unwrap()))
    }

    fn names(specs: &[&FieldSpec]) -> Vec<String> {
        specs.iter().map(|s| s.name.to_string()).collect()
    }

    #[test]
    fn toggle_is_idempotent_both_ways() {
        let set = ColumnSet::new().toggle("pn", true);
        assert_eq!(set.toggle("pn", true), set);
        let hidden = set.toggle("pn", false);
        assert_eq!(hidden.toggle("pn", false), hidden);
        assert!(hidden.is_empty());
    }

    #[test]
    fn group_hide_removes_every_member() {
        let controller = controller();
        let all = controller.select_all();
        let hidden = controller.toggle_group(&all, "audit", false);
        assert_eq!(controller.group_state(&hidden, "audit"), Some(GroupState::None));
        assert_eq!(controller.group_state(&hidden, "basic"), Some(GroupState::All));
    }

    #[test]
    fn group_state_tracks_partial_selection() {
        let controller = controller();
        let set = controller.toggle(&ColumnSet::new(), "pn", true);
        assert_eq!(controller.group_state(&set, "basic"), Some(GroupState::Partial));
        assert_eq!(controller.group_state(&set, "nope"), None);
    }

    #[test]
    fn unknown_field_toggle_is_noop() {
        let controller = controller();
        let set = controller.reset();
        assert_eq!(controller.toggle(&set, "ghost", true), set);
        assert_eq!(controller.toggle_group(&set, "ghosts", true), set);
    }

    #[test]
    fn reset_yields_default_columns_in_schema_order() {
        let controller = controller();
        let mut set = controller.select_all();
        set = controller.toggle_group(&set, "sales", false);
        let reset = controller.reset();
        assert_eq!(
            names(&controller.ordered(&reset)),
            vec!["pdt", "pn", "auditCorrectedQuantity"]
        );
        assert_ne!(reset, set);
    }

    #[test]
    fn retain_known_drops_stale_columns() {
        let controller = controller();
        let set: ColumnSet = ["pn", "retired"].into_iter().collect();
        assert_eq!(controller.retain_known(&set), ColumnSet::new().toggle("pn", true));
    }

    proptest! {
        #[test]
        fn prop_toggle_on_is_idempotent(
            fields in proptest::collection::vec("[a-z]{1,4}", 0..8),
            field in "[a-z]{1,4}",
        ) {
            let set: ColumnSet = fields.into_iter().collect();
            let once = set.toggle(&field, true);
            prop_assert_eq!(once.toggle(&field, true), once.clone());
            prop_assert!(once.contains(&field));
        }
    }
}
