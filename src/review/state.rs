//! Moderator review states and modes.

use serde::{Deserialize, Serialize};

use crate::classifier::SuspensionLength;
use crate::triage::QueueKind;

/// The states of a moderator review.
///
/// Manual: Dispatch → CheckUrgency → (ReportAuthorities → [SubmitReport] |
/// DetermineSuspensionDuration) → FinalDecision → (Dispatch | Complete).
///
/// Assisted: Dispatch → FinalDecision → Complete, unless the classifier
/// gives no usable verdict, in which case the item continues at CheckUrgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Dispatch,
    CheckUrgency,
    ReportAuthorities,
    SubmitReport,
    DetermineSuspensionDuration,
    FinalDecision,
    Complete,
}

impl ReviewState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ReviewState) -> bool {
        use ReviewState::*;
        if matches!(target, Complete | Dispatch) {
            // Cancel and re-dispatch are accepted in every live state.
            return !self.is_terminal();
        }
        matches!(
            (self, target),
            (Dispatch, CheckUrgency)
                | (Dispatch, FinalDecision)
                | (CheckUrgency, ReportAuthorities)
                | (CheckUrgency, DetermineSuspensionDuration)
                | (ReportAuthorities, SubmitReport)
                | (ReportAuthorities, FinalDecision)
                | (SubmitReport, FinalDecision)
                | (DetermineSuspensionDuration, FinalDecision)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for ReviewState {
    fn default() -> Self {
        Self::Dispatch
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Dispatch => "dispatch",
            Self::CheckUrgency => "check_urgency",
            Self::ReportAuthorities => "report_authorities",
            Self::SubmitReport => "submit_report",
            Self::DetermineSuspensionDuration => "determine_suspension_duration",
            Self::FinalDecision => "final_decision",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Which queue a review pops from and whether the classifier decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReviewMode {
    pub source: QueueKind,
    pub assisted: bool,
}

impl ReviewMode {
    /// `review`
    pub const MANUAL: Self = Self {
        source: QueueKind::Manual,
        assisted: false,
    };
    /// `detected review`
    pub const DETECTED: Self = Self {
        source: QueueKind::Automated,
        assisted: false,
    };
    /// `automate review`
    pub const MANUAL_ASSISTED: Self = Self {
        source: QueueKind::Manual,
        assisted: true,
    };
    /// `claude review`
    pub const DETECTED_ASSISTED: Self = Self {
        source: QueueKind::Automated,
        assisted: true,
    };

    /// The keyword a moderator sends to start this mode.
    pub fn keyword(&self) -> &'static str {
        match (self.source, self.assisted) {
            (QueueKind::Manual, false) => "review",
            (QueueKind::Automated, false) => "detected review",
            (QueueKind::Manual, true) => "automate review",
            (QueueKind::Automated, true) => "claude review",
        }
    }

    pub fn is_automated(&self) -> bool {
        self.source == QueueKind::Automated
    }

    /// The same queue, decided by hand.
    pub fn unassisted(self) -> Self {
        Self {
            assisted: false,
            ..self
        }
    }
}

impl std::fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let how = if self.assisted { "assisted" } else { "unassisted" };
        write!(f, "{}/{how}", self.source)
    }
}

/// The outcome of reviewing one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Reported to the authorities.
    Escalated,
    Suspended(SuspensionLength),
    /// Reviewed, no action taken.
    NoAction,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Escalated => write!(f, "escalated"),
            Self::Suspended(SuspensionLength::Days(n)) => write!(f, "suspended_{n}d"),
            Self::Suspended(SuspensionLength::Indefinite) => write!(f, "suspended_indefinitely"),
            Self::NoAction => write!(f, "no_action"),
        }
    }
}
