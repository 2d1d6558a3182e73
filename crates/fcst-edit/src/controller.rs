//! Cell edit controller
//!
//! Validates and normalizes a single-cell edit, applies it to the record
//! store through an [`EditPatch`], and in debounced mode schedules the
//! downstream commit. Added and removed rows are sent to the sink at once.
//! Local state is always updated first and is never rolled back because of
//! a commit failure.

use crate::config::{EditConfig, EditMode};
use crate::debounce::{DebounceState, Debouncer};
use crate::error::EditError;
use crate::sink::{CommitError, CommitSink, Notifier};
use fcst_record::{
    EditPatch, EntitySchema, FieldName, PartialFields, Record, RecordError, RecordKey,
    RecordStore, Scalar, ValueKind,
};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Result of one applied edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// Edited record
    pub key: RecordKey,
    /// Edited field
    pub field: FieldName,
    /// Value before the edit
    pub previous: Scalar,
    /// Value stored
    pub value: Scalar,
    /// Input was below the floor and was raised to it
    pub clamped: bool,
}

/// Result of [`CellEditController::batch_edit`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Edits applied, in input order
    pub applied: Vec<EditOutcome>,
    /// Edits refused, with the reason
    pub failed: Vec<(EditPatch, EditError)>,
}

/// Applies cell edits to a store and schedules their commits
#[derive(Debug)]
pub struct CellEditController {
    config: EditConfig,
    debouncer: Option<Debouncer>,
}

impl CellEditController {
    /// Controller that only updates the local store
    #[must_use]
    pub fn immediate(config: EditConfig) -> Self {
        Self {
            config: config.with_mode(EditMode::Immediate),
            debouncer: None,
        }
    }

    /// Controller that commits to `sink` after the configured quiet window
    ///
    /// # Errors
    /// - `EditError::InvalidConfig` if the configuration does not validate
    /// - `EditError::NoRuntime` outside a tokio runtime
    pub fn debounced(
        config: EditConfig,
        sink: Arc<dyn CommitSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, EditError> {
        let config = config.with_mode(EditMode::Debounced);
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| EditError::NoRuntime)?;
        let debouncer = Debouncer::new(config.window(), sink, notifier, runtime);
        tracing::debug!(window_ms = config.debounce_ms, "debounced edit controller ready");
        Ok(Self {
            config,
            debouncer: Some(debouncer),
        })
    }

    /// Controller in whichever mode `config` selects
    ///
    /// # Errors
    /// See [`CellEditController::debounced`].
    pub fn from_config(
        config: EditConfig,
        sink: Arc<dyn CommitSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, EditError> {
        match config.mode {
            EditMode::Immediate => {
                config.validate()?;
                Ok(Self::immediate(config))
            }
            EditMode::Debounced => Self::debounced(config, sink, notifier),
        }
    }

    /// Active mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.config.mode
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// The debouncer, in debounced mode
    #[inline]
    #[must_use]
    pub fn debouncer(&self) -> Option<&Debouncer> {
        self.debouncer.as_ref()
    }

    /// Check that `field` is editable and normalize `value` for it.
    ///
    /// Numeric fields parse textual input (thousands separators allowed),
    /// read blank input as zero, and raise values below the floor to it.
    /// Returns the value to store and whether it was clamped.
    ///
    /// # Errors
    /// - `EditError::Record` wrapping `KeyFieldImmutable` or `UnknownField`
    /// - `EditError::NotEditable` for identity and derived fields
    /// - `EditError::InvalidNumber` for unparseable or non-finite numbers
    pub fn prepare(
        &self,
        schema: &EntitySchema,
        field: &str,
        value: Scalar,
    ) -> Result<(Scalar, bool), EditError> {
        let name = FieldName::from(field);
        if schema.key_field() == &name {
            return Err(RecordError::KeyFieldImmutable(name).into());
        }
        let spec = schema.field(field).ok_or_else(|| RecordError::UnknownField {
            entity: schema.name().to_string(),
            field: name.clone(),
        })?;
        if !spec.is_editable() {
            return Err(EditError::NotEditable(name));
        }

        match &spec.value_kind {
            ValueKind::Number => {
                let number = match &value {
                    Scalar::Null => Some(0.0),
                    Scalar::Text(s) if s.trim().is_empty() => Some(0.0),
                    other => other.to_number(),
                }
                .ok_or_else(|| EditError::InvalidNumber {
                    field: name,
                    input: value.to_string(),
                })?;
                if number < self.config.floor {
                    Ok((Scalar::Number(self.config.floor), true))
                } else {
                    Ok((Scalar::Number(number), false))
                }
            }
            ValueKind::Text => match value {
                Scalar::Number(_) | Scalar::Bool(_) => Ok((Scalar::Text(value.to_string()), false)),
                other => Ok((other, false)),
            },
            ValueKind::Bool | ValueKind::Enum(_) => Ok((value, false)),
        }
    }

    /// Edit one cell.
    ///
    /// The store is updated before this returns. In debounced mode the
    /// commit is scheduled and any pending commit for the same cell is
    /// superseded.
    ///
    /// # Errors
    /// Any error from [`CellEditController::prepare`], or
    /// `EditError::Record` if the store rejects the patch. The store is
    /// untouched on error.
    pub fn edit(
        &self,
        store: &mut RecordStore,
        key: &str,
        field: &str,
        value: impl Into<Scalar>,
    ) -> Result<EditOutcome, EditError> {
        let outcome = self.apply(store, key, field, value.into())?;
        if let Some(debouncer) = &self.debouncer {
            debouncer.schedule(outcome.key.clone(), outcome.field.clone(), outcome.value.clone());
        }
        Ok(outcome)
    }

    /// Apply many edits, reporting each one.
    ///
    /// In debounced mode the applied edits are committed together as one
    /// batch, replacing pending commits for the same cells.
    pub fn batch_edit(
        &self,
        store: &mut RecordStore,
        patches: impl IntoIterator<Item = EditPatch>,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for patch in patches {
            match self.apply(store, patch.key.as_str(), patch.field.as_str(), patch.value.clone()) {
                Ok(applied) => outcome.applied.push(applied),
                Err(e) => outcome.failed.push((patch, e)),
            }
        }
        tracing::debug!(
            entity = store.schema().name(),
            applied = outcome.applied.len(),
            failed = outcome.failed.len(),
            "batch edit"
        );

        if let Some(debouncer) = &self.debouncer {
            let mut updates: Vec<(RecordKey, PartialFields)> = Vec::new();
            for applied in &outcome.applied {
                match updates.iter_mut().find(|(k, _)| k == &applied.key) {
                    Some((_, fields)) => {
                        fields.insert(applied.field.clone(), applied.value.clone());
                    }
                    None => {
                        let mut fields = PartialFields::new();
                        fields.insert(applied.field.clone(), applied.value.clone());
                        updates.push((applied.key.clone(), fields));
                    }
                }
            }
            debouncer.commit_batch_now(updates);
        }
        outcome
    }

    /// Add a record to the store; in debounced mode also send it to the sink
    ///
    /// # Errors
    /// `EditError::Record` if the store refuses the record, for example on
    /// a duplicate key. Nothing is sent in that case.
    pub fn create(&self, store: &mut RecordStore, record: Record) -> Result<(), EditError> {
        let persisted = self.debouncer.as_ref().map(|_| record.clone());
        store.insert(record)?;
        if let (Some(debouncer), Some(record)) = (&self.debouncer, persisted) {
            debouncer.create_now(record);
        }
        Ok(())
    }

    /// Remove a record from the store; in debounced mode also delete it
    /// downstream and drop its pending commits
    ///
    /// # Errors
    /// `EditError::Record` if no record has `key`
    pub fn delete(&self, store: &mut RecordStore, key: &str) -> Result<Record, EditError> {
        let removed = store.remove(key)?;
        if let Some(debouncer) = &self.debouncer {
            debouncer.delete_now(removed.key().clone());
        }
        Ok(removed)
    }

    /// Commit every pending edit now. Returns 0 in immediate mode.
    ///
    /// # Errors
    /// Returns the sink's `CommitError`.
    pub async fn flush(&self) -> Result<usize, CommitError> {
        match &self.debouncer {
            Some(debouncer) => debouncer.flush().await,
            None => Ok(0),
        }
    }

    /// Drop the pending commit of one cell
    pub fn cancel(&self, key: &str, field: &str) -> Option<Scalar> {
        self.debouncer
            .as_ref()?
            .cancel(&RecordKey::from(key), &FieldName::from(field))
    }

    /// Commit state of one cell; always idle in immediate mode
    #[must_use]
    pub fn state(&self, key: &str, field: &str) -> DebounceState {
        self.debouncer
            .as_ref()
            .map(|d| d.state(&RecordKey::from(key), &FieldName::from(field)))
            .unwrap_or_default()
    }

    fn apply(
        &self,
        store: &mut RecordStore,
        key: &str,
        field: &str,
        value: Scalar,
    ) -> Result<EditOutcome, EditError> {
        let (value, clamped) = self.prepare(store.schema(), field, value)?;
        let patch = EditPatch::new(key, field, value);
        let previous = store.apply_patch(&patch)?;
        if clamped {
            tracing::debug!(key, field, floor = self.config.floor, "clamped edit to floor");
        }
        Ok(EditOutcome {
            key: patch.key,
            field: patch.field,
            previous,
            value: patch.value,
            clamped,
        })
    }
}
