//! Strict parser for the classifier's free-text review verdict.

use std::sync::LazyLock;

use regex::Regex;

static SUSPENSION_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+|Indefinite").expect("suspension regex is valid"));

/// How long a user is suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspensionLength {
    Days(u32),
    Indefinite,
}

impl SuspensionLength {
    /// The decision line shown to the moderator.
    pub fn decision_message(&self) -> String {
        match self {
            Self::Days(1) => "User suspended for 1 day.".to_string(),
            Self::Days(n) => format!("User suspended for {n} days."),
            Self::Indefinite => "User suspended indefinitely.".to_string(),
        }
    }
}

/// A classified review verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Escalate to the authorities.
    Escalate,
    Suspend(SuspensionLength),
    /// Text matching neither form; carries the raw text.
    Unrecognized(String),
}

impl Verdict {
    /// Parse verdict text.
    ///
    /// `Immediate threat` (exactly, ignoring surrounding whitespace) escalates.
    /// Text containing `suspension` suspends for the first run of digits, or
    /// indefinitely on `Indefinite`, whichever comes first.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text == "Immediate threat" {
            return Self::Escalate;
        }
        if text.contains("suspension") {
            if let Some(m) = SUSPENSION_LENGTH_RE.find(text) {
                if m.as_str() == "Indefinite" {
                    return Self::Suspend(SuspensionLength::Indefinite);
                }
                if let Ok(days) = m.as_str().parse::<u32>() {
                    return Self::Suspend(SuspensionLength::Days(days));
                }
            }
        }
        Self::Unrecognized(text.to_string())
    }
}
