//! Persistent mailbox contracts.
//!
//! Mailbox records are notifications the platform stored server-side. They always carry an id,
//! which makes them eligible for delete-on-remove.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Object-safe boxed future used by [`MailboxService`].
pub type MailboxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Selection of mailbox records. An empty id list matches every record.
pub struct MailboxQuery {
    /// Record ids to match.
    pub ids: Vec<String>,
    /// Maximum number of records to return from `find`.
    pub limit: Option<usize>,
}

impl MailboxQuery {
    /// Query matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Query matching a single record id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            ids: vec![id.into()],
            limit: None,
        }
    }

    /// Returns whether `id` satisfies the id filter.
    pub fn matches(&self, id: &str) -> bool {
        self.ids.is_empty() || self.ids.iter().any(|candidate| candidate == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Raw mailbox record as stored by the platform.
pub struct MailRecord {
    /// Stable record id.
    pub id: String,
    /// Raw notification payload, in the same shape the push channel delivers.
    pub payload: Value,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Mailbox failures.
pub enum MailboxError {
    /// The record does not exist (HTTP 404). Callers treat this as a benign no-op.
    #[error("mailbox record not found")]
    NotFound,
    /// Network or service failure.
    #[error("mailbox request failed: {0}")]
    Failed(String),
}

/// Host service for the platform's persistent mailbox.
pub trait MailboxService {
    /// Finds records matching `query`.
    fn find<'a>(
        &'a self,
        query: &'a MailboxQuery,
    ) -> MailboxFuture<'a, Result<Vec<MailRecord>, MailboxError>>;

    /// Deletes records matching `query`.
    fn delete<'a>(&'a self, query: &'a MailboxQuery) -> MailboxFuture<'a, Result<(), MailboxError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Mailbox service with no records.
pub struct NoopMailboxService;

impl MailboxService for NoopMailboxService {
    fn find<'a>(
        &'a self,
        _query: &'a MailboxQuery,
    ) -> MailboxFuture<'a, Result<Vec<MailRecord>, MailboxError>> {
        Box::pin(async { Ok(Vec::new()) })
    }

    fn delete<'a>(
        &'a self,
        _query: &'a MailboxQuery,
    ) -> MailboxFuture<'a, Result<(), MailboxError>> {
        Box::pin(async { Err(MailboxError::NotFound) })
    }
}

#[derive(Debug, Default)]
struct MemoryMailboxInner {
    records: RefCell<Vec<MailRecord>>,
    deleted: RefCell<Vec<String>>,
    fail: Cell<bool>,
}

#[derive(Debug, Clone, Default)]
/// In-memory mailbox for tests. Clones share records.
pub struct MemoryMailboxService {
    inner: Rc<MemoryMailboxInner>,
}

impl MemoryMailboxService {
    /// Creates a mailbox seeded with `records`.
    pub fn with_records(records: Vec<MailRecord>) -> Self {
        let service = Self::default();
        *service.inner.records.borrow_mut() = records;
        service
    }

    /// Makes every subsequent request fail with [`MailboxError::Failed`].
    pub fn set_failing(&self, fail: bool) {
        self.inner.fail.set(fail);
    }

    /// Returns ids deleted so far, in deletion order.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.inner.deleted.borrow().clone()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.inner.records.borrow().len()
    }

    /// Returns whether the mailbox is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.records.borrow().is_empty()
    }
}

impl MailboxService for MemoryMailboxService {
    fn find<'a>(
        &'a self,
        query: &'a MailboxQuery,
    ) -> MailboxFuture<'a, Result<Vec<MailRecord>, MailboxError>> {
        Box::pin(async move {
            if self.inner.fail.get() {
                return Err(MailboxError::Failed("mailbox offline".to_string()));
            }
            let records = self.inner.records.borrow();
            let matched = records.iter().filter(|record| query.matches(&record.id));
            Ok(match query.limit {
                Some(limit) => matched.take(limit).cloned().collect(),
                None => matched.cloned().collect(),
            })
        })
    }

    fn delete<'a>(&'a self, query: &'a MailboxQuery) -> MailboxFuture<'a, Result<(), MailboxError>> {
        Box::pin(async move {
            if self.inner.fail.get() {
                return Err(MailboxError::Failed("mailbox offline".to_string()));
            }
            let mut records = self.inner.records.borrow_mut();
            let before = records.len();
            let mut removed = Vec::new();
            records.retain(|record| {
                let hit = query.matches(&record.id);
                if hit {
                    removed.push(record.id.clone());
                }
                !hit
            });
            if records.len() == before {
                return Err(MailboxError::NotFound);
            }
            self.inner.deleted.borrow_mut().extend(removed);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(id: &str) -> MailRecord {
        MailRecord {
            id: id.to_string(),
            payload: json!({ "message": { "payload": {}, "metadata": { "desc": id } } }),
        }
    }

    #[test]
    fn find_filters_by_id_and_limit() {
        let mailbox = MemoryMailboxService::with_records(vec![record("a"), record("b"), record("c")]);

        let all = block_on(mailbox.find(&MailboxQuery::all())).expect("find all");
        assert_eq!(all.len(), 3);

        let one = block_on(mailbox.find(&MailboxQuery::by_id("b"))).expect("find one");
        assert_eq!(one, vec![record("b")]);

        let limited = MailboxQuery {
            ids: Vec::new(),
            limit: Some(2),
        };
        assert_eq!(block_on(mailbox.find(&limited)).expect("find limited").len(), 2);
    }

    #[test]
    fn delete_missing_record_reports_not_found() {
        let mailbox = MemoryMailboxService::with_records(vec![record("a")]);

        block_on(mailbox.delete(&MailboxQuery::by_id("a"))).expect("delete");
        assert_eq!(
            block_on(mailbox.delete(&MailboxQuery::by_id("a"))),
            Err(MailboxError::NotFound)
        );
        assert_eq!(mailbox.deleted_ids(), vec!["a".to_string()]);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn failing_mailbox_rejects_requests() {
        let mailbox = MemoryMailboxService::with_records(vec![record("a")]);
        mailbox.set_failing(true);
        assert!(matches!(
            block_on(mailbox.find(&MailboxQuery::all())),
            Err(MailboxError::Failed(_))
        ));
        assert_eq!(mailbox.len(), 1);
    }
}
