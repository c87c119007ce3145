//! Moderator review dialogue.
//!
//! Moderators work in the guild's moderator channel. A review keyword pops the
//! next item from the manual or automated queue; the decision is taken either
//! by the moderator answering a short question sequence or by the classifier.
//! After each decision the continuation gate either offers the next item or
//! ends the session.

pub mod continuation;
pub mod flow;
pub mod prompts;
pub mod state;

pub use continuation::Continuation;
pub use flow::{ReviewCancelPolicy, ReviewContext, ReviewInput, ReviewOutcome, ReviewSession};
pub use state::{Decision, ReviewMode, ReviewState};
