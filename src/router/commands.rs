//! Command grammar, evaluated once per inbound message.
//!
//! Keywords are case-sensitive. `help` and `cancel` must be the whole
//! message; `report` and the review keywords only need to start it.

use crate::review::ReviewMode;

/// Commands a reporter can send by DM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterCommand<'a> {
    Help,
    /// Starts a report when none is open.
    Start,
    Cancel,
    Text(&'a str),
}

impl<'a> ReporterCommand<'a> {
    pub const HELP_KEYWORD: &'static str = "help";
    pub const START_KEYWORD: &'static str = "report";
    pub const CANCEL_KEYWORD: &'static str = "cancel";

    pub fn parse(content: &'a str) -> Self {
        match content {
            Self::HELP_KEYWORD => Self::Help,
            Self::CANCEL_KEYWORD => Self::Cancel,
            _ if content.starts_with(Self::START_KEYWORD) => Self::Start,
            _ => Self::Text(content),
        }
    }
}

/// Review keywords in match order. Longer keywords come first so that a
/// prefix never shadows them.
const REVIEW_KEYWORDS: [ReviewMode; 4] = [
    ReviewMode::DETECTED,
    ReviewMode::MANUAL_ASSISTED,
    ReviewMode::DETECTED_ASSISTED,
    ReviewMode::MANUAL,
];

/// Commands a moderator can send in the moderator channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeratorCommand<'a> {
    Help,
    Review(ReviewMode),
    Cancel,
    Text(&'a str),
}

impl<'a> ModeratorCommand<'a> {
    pub const HELP_KEYWORD: &'static str = "help";
    pub const CANCEL_KEYWORD: &'static str = "cancel";

    pub fn parse(content: &'a str) -> Self {
        match content {
            Self::HELP_KEYWORD => Self::Help,
            Self::CANCEL_KEYWORD => Self::Cancel,
            _ => REVIEW_KEYWORDS
                .into_iter()
                .find(|mode| content.starts_with(mode.keyword()))
                .map_or(Self::Text(content), Self::Review),
        }
    }
}
