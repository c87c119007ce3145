//! Mod Intake — abuse-report intake and moderator review for a chat platform.

pub mod channels;
pub mod classifier;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod llm;
pub mod platform;
pub mod report;
pub mod review;
pub mod router;
pub mod session;
pub mod triage;
