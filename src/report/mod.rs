//! Reporter intake dialogue.
//!
//! A user DMs `report` and is walked through a fixed question tree. Terrorism
//! reports produce one `TriageRecord` per reported post; the other branches
//! only collect free text. Records are handed back to the caller on the turn
//! the report is submitted and never before.

pub mod flow;
pub mod prompts;
pub mod state;

pub use flow::{ReportInput, ReportOutcome, ReportSession};
pub use state::{AbuseType, ReportState};
