//! Downstream commit targets and user notices
//!
//! A [`CommitSink`] persists new rows, partial field updates and deletions;
//! a [`Notifier`] surfaces failures to the user. Both are collaborators: the edit controller calls
//! them but never waits on them from the edit path.

use fcst_record::{PartialFields, Record, RecordKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Errors reported by a [`CommitSink`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommitError {
    /// The persistence layer refused the update
    #[error("update of '{key}' rejected: {message}")]
    Rejected {
        /// Record the update targeted
        key: RecordKey,
        /// Reason given by the collaborator
        message: String,
    },

    /// The persistence layer could not be reached
    #[error("persistence unavailable: {0}")]
    Unavailable(String),

    /// The collaborator did not answer in time
    #[error("commit timed out after {0:?}")]
    Timeout(Duration),
}

impl CommitError {
    /// Whether retrying the same commit later could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Persistence collaborator for records and edited fields
#[async_trait::async_trait]
pub trait CommitSink: Send + Sync {
    /// Persist a newly added record
    async fn create(&self, record: &Record) -> Result<(), CommitError>;

    /// Persist a partial update of one record
    async fn commit(&self, key: &RecordKey, fields: PartialFields) -> Result<(), CommitError>;

    /// Persist several partial updates.
    ///
    /// The default commits each entry in turn and stops at the first failure.
    async fn commit_batch(&self, updates: Vec<(RecordKey, PartialFields)>) -> Result<(), CommitError> {
        for (key, fields) in updates {
            self.commit(&key, fields).await?;
        }
        Ok(())
    }

    /// Delete a record
    async fn delete(&self, key: &RecordKey) -> Result<(), CommitError>;
}

/// Sink that accepts everything and stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

#[async_trait::async_trait]
impl CommitSink for DiscardSink {
    async fn create(&self, record: &Record) -> Result<(), CommitError> {
        tracing::trace!(key = %record.key(), "discarding create");
        Ok(())
    }

    async fn commit(&self, key: &RecordKey, fields: PartialFields) -> Result<(), CommitError> {
        tracing::trace!(key = %key, fields = fields.len(), "discarding commit");
        Ok(())
    }

    async fn delete(&self, key: &RecordKey) -> Result<(), CommitError> {
        tracing::trace!(key = %key, "discarding delete");
        Ok(())
    }
}

/// Severity of a [`Notice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Informational
    Info,
    /// Something the user should know about; local state is intact
    Warning,
    /// An operation failed
    Error,
}

/// User-visible, non-fatal message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Record concerned, if any
    pub key: Option<RecordKey>,
    /// Message text
    pub message: String,
}

impl Notice {
    /// Create a notice
    #[inline]
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            key: None,
            message: message.into(),
        }
    }

    /// Attach the record concerned
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: RecordKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Notice for a failed commit
    #[must_use]
    pub fn commit_failed(key: Option<RecordKey>, error: &CommitError) -> Self {
        Self {
            level: NoticeLevel::Error,
            key,
            message: format!("save failed, local changes kept: {error}"),
        }
    }
}

/// Receiver of user-visible notices
pub trait Notifier: Send + Sync {
    /// Deliver a notice
    fn notify(&self, notice: Notice);
}

/// Notifier that writes notices to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let key = notice.key.as_ref().map(ToString::to_string).unwrap_or_default();
        match notice.level {
            NoticeLevel::Info => tracing::info!(key = %key, "{}", notice.message),
            NoticeLevel::Warning => tracing::warn!(key = %key, "{}", notice.message),
            NoticeLevel::Error => tracing::error!(key = %key, "{}", notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(CommitError::Unavailable("down".into()).is_retryable());
        assert!(CommitError::Timeout(Duration::from_secs(10)).is_retryable());
        assert!(!CommitError::Rejected {
            key: RecordKey::from("1"),
            message: "locked".into()
        }
        .is_retryable());
    }

    #[test]
    fn commit_failure_notice_keeps_key() {
        let notice = Notice::commit_failed(
            Some(RecordKey::from("7")),
            &CommitError::Unavailable("offline".into()),
        );
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.key, Some(RecordKey::from("7")));
        assert!(notice.message.contains("offline"));
    }

    #[tokio::test]
    async fn default_batch_commits_each_entry() {
        let sink = DiscardSink;
        let updates = vec![
            (RecordKey::from("1"), PartialFields::new()),
            (RecordKey::from("2"), PartialFields::new()),
        ];
        assert!(sink.commit_batch(updates).await.is_ok());
    }
}
