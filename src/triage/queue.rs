//! Triage queues — in-memory FIFO queues shared by the router and review sessions.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use super::model::{AutoDetectedRecord, ReviewItem, TriageRecord};

/// Which of the two queues an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    /// Records submitted by reporters.
    Manual,
    /// Records flagged by the channel auto-scan.
    Automated,
}

impl std::fmt::Display for QueueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Automated => write!(f, "automated"),
        }
    }
}

/// A FIFO queue. Every operation takes the lock once, so a pop is atomic
/// even when several tasks share the queue.
pub struct TriageQueue<T> {
    kind: QueueKind,
    items: Mutex<VecDeque<T>>,
}

impl<T> TriageQueue<T> {
    pub fn new(kind: QueueKind) -> Self {
        Self {
            kind,
            items: Mutex::new(VecDeque::new()),
        }
    }

    /// Append to the tail.
    pub async fn enqueue(&self, item: T) {
        let mut items = self.items.lock().await;
        items.push_back(item);
        debug!(queue = %self.kind, len = items.len(), "Enqueued item");
    }

    /// Remove from the head.
    pub async fn dequeue(&self) -> Option<T> {
        let mut items = self.items.lock().await;
        let item = items.pop_front();
        if item.is_some() {
            debug!(queue = %self.kind, len = items.len(), "Dequeued item");
        }
        item
    }

    /// Put an item back at the head (used when a review is abandoned).
    pub async fn restore(&self, item: T) {
        let mut items = self.items.lock().await;
        items.push_front(item);
        info!(queue = %self.kind, len = items.len(), "Restored item to head of queue");
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

/// The manual and automated queues, shared behind an `Arc`.
pub struct TriageQueues {
    pub manual: TriageQueue<TriageRecord>,
    pub automated: TriageQueue<AutoDetectedRecord>,
}

impl TriageQueues {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            manual: TriageQueue::new(QueueKind::Manual),
            automated: TriageQueue::new(QueueKind::Automated),
        })
    }

    /// Queue a batch of reporter records. Records that do not satisfy the
    /// queueing invariant are skipped. Returns how many were queued.
    pub async fn submit_reports(&self, records: Vec<TriageRecord>) -> usize {
        let mut queued = 0;
        for record in records {
            if !record.is_ready() {
                tracing::warn!(record_id = %record.id, "Skipping incomplete triage record");
                continue;
            }
            info!(
                record_id = %record.id,
                category = ?record.category,
                urgent = ?record.urgent,
                "Report queued for review"
            );
            self.manual.enqueue(record).await;
            queued += 1;
        }
        queued
    }

    /// Queue an auto-detected record.
    pub async fn submit_detection(&self, record: AutoDetectedRecord) {
        info!(
            record_id = %record.id,
            message_id = record.message_id,
            author = %record.author,
            "Automated flag queued for review"
        );
        self.automated.enqueue(record).await;
    }

    /// Pop the next item from the given queue.
    pub async fn next(&self, kind: QueueKind) -> Option<ReviewItem> {
        match kind {
            QueueKind::Manual => self.manual.dequeue().await.map(ReviewItem::Manual),
            QueueKind::Automated => self.automated.dequeue().await.map(ReviewItem::Automated),
        }
    }

    /// Return an abandoned item to the head of the queue it came from.
    pub async fn restore(&self, item: ReviewItem) {
        match item {
            ReviewItem::Manual(r) => self.manual.restore(r).await,
            ReviewItem::Automated(r) => self.automated.restore(r).await,
        }
    }

    pub async fn len(&self, kind: QueueKind) -> usize {
        match kind {
            QueueKind::Manual => self.manual.len().await,
            QueueKind::Automated => self.automated.len().await,
        }
    }
}
