use fcst_edit::{CommitError, CommitSink, Notice, Notifier};
use fcst_record::{PartialFields, Record, RecordKey, Scalar};
use parking_lot::Mutex;

/// Sink that keeps every commit, creation and deletion in arrival order
#[derive(Debug, Default)]
pub struct RecordingSink {
    commits: Mutex<Vec<(RecordKey, PartialFields)>>,
    batches: Mutex<Vec<usize>>,
    created: Mutex<Vec<Record>>,
    deleted: Mutex<Vec<RecordKey>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commits(&self) -> Vec<(RecordKey, PartialFields)> {
        self.commits.lock().clone()
    }

    pub fn commit_count(&self) -> usize {
        self.commits.lock().len()
    }

    /// Sizes of the batches received through `commit_batch`
    pub fn batches(&self) -> Vec<usize> {
        self.batches.lock().clone()
    }

    /// Records received through `create`
    pub fn created(&self) -> Vec<Record> {
        self.created.lock().clone()
    }

    /// Keys received through `delete`
    pub fn deleted(&self) -> Vec<RecordKey> {
        self.deleted.lock().clone()
    }

    /// Value most recently committed for a cell
    pub fn last_value(&self, key: &str, field: &str) -> Option<Scalar> {
        self.commits
            .lock()
            .iter()
            .rev()
            .filter(|(k, _)| k.as_str() == key)
            .find_map(|(_, fields)| fields.get(field).cloned())
    }
}

#[async_trait::async_trait]
impl CommitSink for RecordingSink {
    async fn create(&self, record: &Record) -> Result<(), CommitError> {
        self.created.lock().push(record.clone());
        Ok(())
    }

    async fn commit(&self, key: &RecordKey, fields: PartialFields) -> Result<(), CommitError> {
        self.commits.lock().push((key.clone(), fields));
        Ok(())
    }

    async fn commit_batch(&self, updates: Vec<(RecordKey, PartialFields)>) -> Result<(), CommitError> {
        self.batches.lock().push(updates.len());
        self.commits.lock().extend(updates);
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), CommitError> {
        self.deleted.lock().push(key.clone());
        Ok(())
    }
}

/// Sink that refuses every write
#[derive(Debug)]
pub struct FailingSink {
    error: CommitError,
    attempts: Mutex<usize>,
}

impl FailingSink {
    pub fn new(error: CommitError) -> Self {
        Self {
            error,
            attempts: Mutex::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self::new(CommitError::Unavailable("backend down".into()))
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait::async_trait]
impl CommitSink for FailingSink {
    async fn create(&self, _record: &Record) -> Result<(), CommitError> {
        *self.attempts.lock() += 1;
        Err(self.error.clone())
    }

    async fn commit(&self, _key: &RecordKey, _fields: PartialFields) -> Result<(), CommitError> {
        *self.attempts.lock() += 1;
        Err(self.error.clone())
    }

    async fn delete(&self, _key: &RecordKey) -> Result<(), CommitError> {
        *self.attempts.lock() += 1;
        Err(self.error.clone())
    }
}

/// Notifier that keeps every notice
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
