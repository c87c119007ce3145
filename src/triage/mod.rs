//! Triage records and the queues that connect reporters to moderators.
//!
//! Reporter sessions push completed `TriageRecord`s into the manual queue;
//! the channel auto-scan pushes `AutoDetectedRecord`s into the automated
//! queue. Review sessions pop from either one.

pub mod model;
pub mod queue;

pub use model::{AbuseCategory, AutoDetectedRecord, ReviewItem, ThreatLevel, TriageRecord};
pub use queue::{QueueKind, TriageQueue, TriageQueues};
