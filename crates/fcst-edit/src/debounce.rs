//! Debounced commits
//!
//! Each `(record, field)` pair owns at most one pending commit. A newer value
//! for the same pair replaces the pending one and restarts its quiet window,
//! so only the last value of a burst reaches the [`CommitSink`].
//!
//! Timers are tokio tasks. The slot table sits behind a `parking_lot` mutex
//! that is never held across an await; a generation number stamped on every
//! slot tells a woken timer whether it still owns its slot.
//!
//! Commits touching the same pair pass through a per-pair async gate, so a
//! later value never reaches the sink while an earlier one is in flight.
//! Multi-pair batches take their gates in key order. Row creation and
//! deletion are sent as soon as they happen; deleting a row drops its
//! pending commits.

use crate::sink::{CommitError, CommitSink, Notice, Notifier};
use fcst_record::{FieldName, PartialFields, Record, RecordKey, Scalar};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex as Gate;

/// Default quiet window
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

/// Commit state of one `(record, field)` pair
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DebounceState {
    /// Nothing scheduled
    #[default]
    Idle,
    /// Waiting for the quiet window to pass
    Pending(Scalar),
    /// Handed to the sink, awaiting its answer
    Committed(Scalar),
}

type SlotKey = (RecordKey, FieldName);

#[derive(Debug)]
struct Slot {
    generation: u64,
    state: DebounceState,
}

#[derive(Debug, Default)]
struct Slots {
    next_generation: u64,
    entries: HashMap<SlotKey, Slot>,
}

impl Slots {
    fn stamp(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Whether `generation` still owns a pending slot
    fn owns(&self, slot: &SlotKey, generation: u64) -> bool {
        self.entries.get(slot).is_some_and(|s| {
            s.generation == generation && matches!(s.state, DebounceState::Pending(_))
        })
    }

    /// Drop the slot if `generation` still owns it
    fn release(&mut self, slot: &SlotKey, generation: u64) {
        if self
            .entries
            .get(slot)
            .is_some_and(|s| s.generation == generation)
        {
            self.entries.remove(slot);
        }
    }
}

struct Shared {
    window: Duration,
    sink: Arc<dyn CommitSink>,
    notifier: Arc<dyn Notifier>,
    slots: Mutex<Slots>,
    gates: Mutex<HashMap<SlotKey, Arc<Gate<()>>>>,
}

impl Shared {
    fn gate(&self, slot: &SlotKey) -> Arc<Gate<()>> {
        Arc::clone(self.gates.lock().entry(slot.clone()).or_default())
    }

    /// Run `work` while holding the gates of `slots`, which must be sorted
    /// and free of duplicates
    async fn gated<T>(&self, slots: &[SlotKey], work: impl Future<Output = T>) -> T {
        let gates: Vec<Arc<Gate<()>>> = slots.iter().map(|s| self.gate(s)).collect();
        let mut guards = Vec::with_capacity(gates.len());
        for gate in &gates {
            guards.push(gate.lock().await);
        }
        let out = work.await;
        drop(guards);
        drop(gates);

        let mut table = self.gates.lock();
        for slot in slots {
            if table.get(slot).is_some_and(|g| Arc::strong_count(g) == 1) {
                table.remove(slot);
            }
        }
        out
    }
}

/// Per-`(record, field)` commit debouncer
#[derive(Clone)]
pub struct Debouncer {
    shared: Arc<Shared>,
    runtime: Handle,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.shared.window)
            .field("pending", &self.pending_count())
            .finish_non_exhaustive()
    }
}

impl Debouncer {
    /// Create a debouncer whose timers run on `runtime`
    #[must_use]
    pub fn new(
        window: Duration,
        sink: Arc<dyn CommitSink>,
        notifier: Arc<dyn Notifier>,
        runtime: Handle,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                window,
                sink,
                notifier,
                slots: Mutex::new(Slots::default()),
                gates: Mutex::new(HashMap::new()),
            }),
            runtime,
        }
    }

    /// Quiet window
    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        self.shared.window
    }

    /// Schedule `value` for commit, superseding any pending value for the pair
    pub fn schedule(&self, key: RecordKey, field: FieldName, value: Scalar) {
        let slot = (key, field);
        let generation = {
            let mut slots = self.shared.slots.lock();
            let generation = slots.stamp();
            let replaced = slots.entries.insert(
                slot.clone(),
                Slot {
                    generation,
                    state: DebounceState::Pending(value),
                },
            );
            if matches!(replaced, Some(Slot { state: DebounceState::Pending(_), .. })) {
                tracing::trace!(key = %slot.0, field = %slot.1, "superseded pending commit");
            }
            generation
        };

        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            tokio::time::sleep(shared.window).await;
            Self::fire(&shared, slot, generation).await;
        });
    }

    async fn fire(shared: &Shared, slot: SlotKey, generation: u64) {
        if !shared.slots.lock().owns(&slot, generation) {
            return;
        }
        shared
            .gated(
                std::slice::from_ref(&slot),
                Self::commit_slot(shared, &slot, generation),
            )
            .await;
    }

    async fn commit_slot(shared: &Shared, slot: &SlotKey, generation: u64) {
        let value = {
            let mut slots = shared.slots.lock();
            let Some(entry) = slots.entries.get_mut(slot) else {
                return;
            };
            if entry.generation != generation {
                return;
            }
            let DebounceState::Pending(value) = &entry.state else {
                return;
            };
            let value = value.clone();
            entry.state = DebounceState::Committed(value.clone());
            value
        };

        let (key, field) = slot;
        tracing::debug!(key = %key, field = %field, "committing debounced edit");
        let mut fields = PartialFields::new();
        fields.insert(field.clone(), value);
        let result = shared.sink.commit(key, fields).await;

        shared.slots.lock().release(slot, generation);
        if let Err(e) = result {
            tracing::warn!(key = %key, field = %field, error = %e, "debounced commit failed");
            shared.notifier.notify(Notice::commit_failed(Some(key.clone()), &e));
        }
    }

    /// Current state of a pair
    #[must_use]
    pub fn state(&self, key: &RecordKey, field: &FieldName) -> DebounceState {
        self.shared
            .slots
            .lock()
            .entries
            .get(&(key.clone(), field.clone()))
            .map(|s| s.state.clone())
            .unwrap_or_default()
    }

    /// Number of commits still waiting for their window
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared
            .slots
            .lock()
            .entries
            .values()
            .filter(|s| matches!(s.state, DebounceState::Pending(_)))
            .count()
    }

    /// Drop a pending commit, returning the value that will no longer be sent.
    ///
    /// A commit already handed to the sink cannot be recalled.
    pub fn cancel(&self, key: &RecordKey, field: &FieldName) -> Option<Scalar> {
        let slot = (key.clone(), field.clone());
        let mut slots = self.shared.slots.lock();
        if !matches!(
            slots.entries.get(&slot),
            Some(Slot { state: DebounceState::Pending(_), .. })
        ) {
            return None;
        }
        match slots.entries.remove(&slot) {
            Some(Slot {
                state: DebounceState::Pending(value),
                ..
            }) => {
                tracing::debug!(key = %key, field = %field, "cancelled pending commit");
                Some(value)
            }
            _ => None,
        }
    }

    /// Commit every pending value now, as one batch.
    ///
    /// Sleeping timers for the flushed pairs find their slots gone and exit.
    /// Returns the number of fields committed.
    ///
    /// # Errors
    /// Returns the sink's `CommitError`; the failure is also sent to the
    /// notifier.
    pub async fn flush(&self) -> Result<usize, CommitError> {
        let taken = self.take_pending();
        if taken.is_empty() {
            return Ok(0);
        }
        let count = taken.len();
        let keys: Vec<SlotKey> = taken.iter().map(|(slot, _, _)| slot.clone()).collect();
        let result = self
            .shared
            .gated(&keys, self.shared.sink.commit_batch(group_by_key(&taken)))
            .await;

        {
            let mut slots = self.shared.slots.lock();
            for (slot, generation, _) in &taken {
                slots.release(slot, *generation);
            }
        }

        match result {
            Ok(()) => {
                tracing::debug!(count, "flushed pending commits");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(count, error = %e, "flush failed");
                self.shared.notifier.notify(Notice::commit_failed(None, &e));
                Err(e)
            }
        }
    }

    /// Send a batch right away on the runtime, superseding pending values
    /// for the same pairs. Failures go to the notifier.
    pub fn commit_batch_now(&self, updates: Vec<(RecordKey, PartialFields)>) {
        if updates.is_empty() {
            return;
        }
        {
            let mut slots = self.shared.slots.lock();
            for (key, fields) in &updates {
                for field in fields.keys() {
                    let slot = (key.clone(), field.clone());
                    if matches!(
                        slots.entries.get(&slot),
                        Some(Slot { state: DebounceState::Pending(_), .. })
                    ) {
                        slots.entries.remove(&slot);
                    }
                }
            }
        }

        let mut keys: Vec<SlotKey> = updates
            .iter()
            .flat_map(|(key, fields)| fields.keys().map(move |f| (key.clone(), f.clone())))
            .collect();
        keys.sort();
        keys.dedup();

        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            let rows = updates.len();
            let result = shared.gated(&keys, shared.sink.commit_batch(updates)).await;
            if let Err(e) = result {
                tracing::warn!(rows, error = %e, "batch commit failed");
                shared.notifier.notify(Notice::commit_failed(None, &e));
            } else {
                tracing::debug!(rows, "batch committed");
            }
        });
    }

    /// Send a new record to the sink right away. Failures go to the notifier.
    pub fn create_now(&self, record: Record) {
        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            let key = record.key().clone();
            match shared.sink.create(&record).await {
                Ok(()) => tracing::debug!(key = %key, "record created"),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "create failed");
                    shared.notifier.notify(Notice::commit_failed(Some(key), &e));
                }
            }
        });
    }

    /// Drop pending commits for `key` and send its deletion right away.
    /// Failures go to the notifier.
    pub fn delete_now(&self, key: RecordKey) {
        let dropped = {
            let mut slots = self.shared.slots.lock();
            let before = slots.entries.len();
            slots.entries.retain(|(k, _), slot| {
                k != &key || !matches!(slot.state, DebounceState::Pending(_))
            });
            before - slots.entries.len()
        };
        if dropped > 0 {
            tracing::debug!(key = %key, dropped, "dropped pending commits of deleted record");
        }

        let shared = Arc::clone(&self.shared);
        self.runtime.spawn(async move {
            match shared.sink.delete(&key).await {
                Ok(()) => tracing::debug!(key = %key, "record deleted"),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "delete failed");
                    shared.notifier.notify(Notice::commit_failed(Some(key), &e));
                }
            }
        });
    }

    fn take_pending(&self) -> Vec<(SlotKey, u64, Scalar)> {
        let mut slots = self.shared.slots.lock();
        let generation = slots.stamp();
        let mut taken = Vec::new();
        for (slot, entry) in &mut slots.entries {
            if let DebounceState::Pending(value) = &entry.state {
                let value = value.clone();
                entry.state = DebounceState::Committed(value.clone());
                entry.generation = generation;
                taken.push((slot.clone(), generation, value));
            }
        }
        taken.sort_by(|a, b| a.0.cmp(&b.0));
        taken
    }
}

/// Merge per-field values into one partial update per record
fn group_by_key(taken: &[(SlotKey, u64, Scalar)]) -> Vec<(RecordKey, PartialFields)> {
    let mut grouped: Vec<(RecordKey, PartialFields)> = Vec::new();
    for ((key, field), _, value) in taken {
        match grouped.iter_mut().find(|(k, _)| k == key) {
            Some((_, fields)) => {
                fields.insert(field.clone(), value.clone());
            }
            None => {
                let mut fields = PartialFields::new();
                fields.insert(field.clone(), value.clone());
                grouped.push((key.clone(), fields));
            }
        }
    }
    grouped
}
