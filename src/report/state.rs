//! Reporter dialogue states.

use serde::{Deserialize, Serialize};

/// The states of the reporter dialogue.
///
/// Terror branch: Start → AwaitingAbuseType → AwaitingGroupId →
/// AwaitingPostCategory → AwaitingContextMessage → AwaitingThreatLevel →
/// [AwaitingGroupLocation] → AwaitingLoop → (AwaitingPostCategory again |
/// AwaitingSubmission) → Complete.
///
/// Other branches: AwaitingAbuseType → AwaitingAdditionalContext →
/// AwaitingSubmission → Complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportState {
    Start,
    AwaitingAbuseType,
    AwaitingAdditionalContext,
    AwaitingGroupId,
    AwaitingPostCategory,
    AwaitingContextMessage,
    AwaitingThreatLevel,
    AwaitingGroupLocation,
    AwaitingLoop,
    AwaitingSubmission,
    Complete,
}

impl ReportState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ReportState) -> bool {
        use ReportState::*;
        if target == Complete {
            // Cancel is reachable from every non-terminal state.
            return !self.is_terminal();
        }
        matches!(
            (self, target),
            (Start, AwaitingAbuseType)
                | (AwaitingAbuseType, AwaitingAdditionalContext)
                | (AwaitingAbuseType, AwaitingGroupId)
                | (AwaitingAdditionalContext, AwaitingSubmission)
                | (AwaitingGroupId, AwaitingPostCategory)
                | (AwaitingPostCategory, AwaitingContextMessage)
                | (AwaitingContextMessage, AwaitingThreatLevel)
                | (AwaitingThreatLevel, AwaitingGroupLocation)
                | (AwaitingThreatLevel, AwaitingLoop)
                | (AwaitingGroupLocation, AwaitingLoop)
                | (AwaitingLoop, AwaitingPostCategory)
                | (AwaitingLoop, AwaitingSubmission)
        )
    }

    /// Whether the dialogue is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl Default for ReportState {
    fn default() -> Self {
        Self::Start
    }
}

impl std::fmt::Display for ReportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::AwaitingAbuseType => "awaiting_abuse_type",
            Self::AwaitingAdditionalContext => "awaiting_additional_context",
            Self::AwaitingGroupId => "awaiting_group_id",
            Self::AwaitingPostCategory => "awaiting_post_category",
            Self::AwaitingContextMessage => "awaiting_context_message",
            Self::AwaitingThreatLevel => "awaiting_threat_level",
            Self::AwaitingGroupLocation => "awaiting_group_location",
            Self::AwaitingLoop => "awaiting_loop",
            Self::AwaitingSubmission => "awaiting_submission",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Answer to the first question: what kind of abuse is being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbuseType {
    Harassment,
    ExplicitImagery,
    Terrorism,
    Other,
}

impl AbuseType {
    pub fn from_menu_option(option: u8) -> Option<Self> {
        match option {
            1 => Some(Self::Harassment),
            2 => Some(Self::ExplicitImagery),
            3 => Some(Self::Terrorism),
            4 => Some(Self::Other),
            _ => None,
        }
    }

    /// Only terrorism reports collect a structured record.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Terrorism)
    }
}

/// Parse a menu answer: a single digit, optionally in parentheses
/// (`3` or `(3)`).
pub fn parse_menu_option(input: &str) -> Option<u8> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);
    if inner.len() != 1 {
        return None;
    }
    inner.parse().ok()
}
