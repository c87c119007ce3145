//! Triage data models — reporter-submitted records and auto-detected flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::platform::MessageId;

/// Content category of a reported post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbuseCategory {
    Imagery,
    Coordination,
    Propaganda,
    Threat,
    Other,
}

impl AbuseCategory {
    /// All categories in menu order (menu option `n` is `ALL[n - 1]`).
    pub const ALL: [AbuseCategory; 5] = [
        Self::Imagery,
        Self::Coordination,
        Self::Propaganda,
        Self::Threat,
        Self::Other,
    ];

    /// Map a 1-based menu option to a category.
    pub fn from_menu_option(option: u8) -> Option<Self> {
        match option {
            1..=5 => Some(Self::ALL[usize::from(option) - 1]),
            _ => None,
        }
    }

    /// Human-readable label shown in menus and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Imagery => "Graphic or violent imagery",
            Self::Coordination => "Coordination or recruitment logistics",
            Self::Propaganda => "Propaganda or glorification",
            Self::Threat => "Direct threat of violence",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for AbuseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Imagery => "imagery",
            Self::Coordination => "coordination",
            Self::Propaganda => "propaganda",
            Self::Threat => "threat",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// Structured output of a completed reporter dialogue.
///
/// `category` and `urgent` must both be set before the record is queued;
/// everything else may stay unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageRecord {
    pub id: Uuid,
    /// Organization the reporter attributes the content to. `None` = unknown.
    pub organization_name: Option<String>,
    pub category: Option<AbuseCategory>,
    /// Raw text the reporter sent alongside the message link.
    pub context: Option<String>,
    pub location: Option<String>,
    /// Author of the reported message.
    pub suspect: Option<String>,
    pub urgent: Option<bool>,
    /// Estimated group size.
    pub size: Option<u32>,
    /// Content of the reported message.
    pub post_content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Default for TriageRecord {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_name: None,
            category: None,
            context: None,
            location: None,
            suspect: None,
            urgent: None,
            size: None,
            post_content: None,
            created_at: Utc::now(),
        }
    }
}

impl TriageRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh record for the next post in the same report. Only the
    /// organization carries over.
    pub fn next_for_same_group(&self) -> Self {
        Self {
            organization_name: self.organization_name.clone(),
            ..Self::default()
        }
    }

    /// Whether the record satisfies the queueing invariant.
    pub fn is_ready(&self) -> bool {
        self.category.is_some() && self.urgent.is_some()
    }

    /// Render the record for a moderator.
    pub fn summary(&self) -> String {
        let unknown = "unknown";
        let mut parts = vec![format!(
            "**Report {}** ({})",
            self.id,
            self.created_at.format("%Y-%m-%d %H:%M UTC")
        )];
        parts.push(format!(
            "- **Organization:** {}",
            self.organization_name.as_deref().unwrap_or(unknown)
        ));
        parts.push(format!(
            "- **Category:** {}",
            self.category.map(|c| c.label()).unwrap_or(unknown)
        ));
        parts.push(format!(
            "- **Urgent:** {}",
            match self.urgent {
                Some(true) => "yes",
                Some(false) => "no",
                None => unknown,
            }
        ));
        parts.push(format!(
            "- **Suspect:** {}",
            self.suspect.as_deref().unwrap_or(unknown)
        ));
        parts.push(format!(
            "- **Post:** {}",
            self.post_content.as_deref().unwrap_or(unknown)
        ));
        parts.push(format!(
            "- **Reporter context:** {}",
            self.context.as_deref().unwrap_or(unknown)
        ));
        if self.urgent == Some(true) {
            parts.push(format!(
                "- **Location:** {}",
                self.location.as_deref().unwrap_or(unknown)
            ));
            parts.push(format!(
                "- **Group size:** {}",
                self.size.map(|s| s.to_string()).as_deref().unwrap_or(unknown)
            ));
        }
        parts.join("\n")
    }
}

/// Threat level assigned by the auto-scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    Threatening,
}

/// A channel message the classifier flagged on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoDetectedRecord {
    pub id: Uuid,
    pub post_content: String,
    pub message_id: MessageId,
    pub author: String,
    pub channel: String,
    pub threat_level: Option<ThreatLevel>,
    pub detected_at: DateTime<Utc>,
}

impl AutoDetectedRecord {
    pub fn new(
        post_content: impl Into<String>,
        message_id: MessageId,
        author: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_content: post_content.into(),
            message_id,
            author: author.into(),
            channel: channel.into(),
            threat_level: None,
            detected_at: Utc::now(),
        }
    }

    pub fn with_threat_level(mut self, level: ThreatLevel) -> Self {
        self.threat_level = Some(level);
        self
    }

    /// Render the record for a moderator.
    pub fn summary(&self) -> String {
        [
            format!(
                "**Automated flag {}** ({})",
                self.id,
                self.detected_at.format("%Y-%m-%d %H:%M UTC")
            ),
            format!("- **Post:** {}", self.post_content),
            format!("- **Message ID:** {}", self.message_id),
            format!("- **Author:** {}", self.author),
            format!("- **Channel:** {}", self.channel),
            format!(
                "- **Threat level:** {}",
                match self.threat_level {
                    Some(ThreatLevel::Threatening) => "threatening",
                    None => "unknown",
                }
            ),
        ]
        .join("\n")
    }
}

/// An item popped from one of the queues for review.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewItem {
    Manual(TriageRecord),
    Automated(AutoDetectedRecord),
}

impl ReviewItem {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Manual(r) => r.id,
            Self::Automated(r) => r.id,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Manual(r) => r.summary(),
            Self::Automated(r) => r.summary(),
        }
    }
}
