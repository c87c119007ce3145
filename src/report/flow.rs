//! ReportSession — drives one reporter through the intake dialogue.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};
use uuid::Uuid;

use super::prompts;
use super::state::{AbuseType, ReportState, parse_menu_option};
use crate::platform::{ChatPlatform, UserId, resolve_link};
use crate::triage::{AbuseCategory, TriageRecord};

static KNOWN_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"known:\s*(.+)").expect("group regex is valid"));

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\s*([^,()]+?)\s*,\s*(\d+)\s*\)$").expect("location regex is valid")
});

/// Input to the reporter dialogue, already classified by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportInput<'a> {
    Cancel,
    Text(&'a str),
}

/// What one turn produced.
#[derive(Debug, Default)]
pub struct ReportOutcome {
    /// Replies to send, in order.
    pub replies: Vec<String>,
    /// Finished records to queue. `Some` only on the turn the report is
    /// submitted, and only when there is at least one record.
    pub records: Option<Vec<TriageRecord>>,
}

/// One reporter's dialogue.
pub struct ReportSession {
    id: Uuid,
    reporter: UserId,
    state: ReportState,
    abuse_type: Option<AbuseType>,
    /// Record for the post currently being described.
    record: TriageRecord,
    /// Records finished earlier in this report.
    completed: Vec<TriageRecord>,
    /// Free text collected by the non-structured branches.
    additional_context: Option<String>,
}

impl ReportSession {
    pub fn new(reporter: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            reporter,
            state: ReportState::Start,
            abuse_type: None,
            record: TriageRecord::new(),
            completed: Vec::new(),
            additional_context: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn reporter(&self) -> UserId {
        self.reporter
    }

    pub fn state(&self) -> ReportState {
        self.state
    }

    /// The in-progress record.
    pub fn record(&self) -> &TriageRecord {
        &self.record
    }

    /// Records finished so far but not yet submitted.
    pub fn completed(&self) -> &[TriageRecord] {
        &self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    /// Process one message from the reporter.
    pub async fn handle_message(
        &mut self,
        input: ReportInput<'_>,
        platform: &dyn ChatPlatform,
    ) -> ReportOutcome {
        if self.is_complete() {
            return ReportOutcome::default();
        }

        let text = match input {
            ReportInput::Cancel => return self.cancel(),
            ReportInput::Text(text) => text.trim(),
        };

        let mut replies = Vec::new();
        match self.state {
            ReportState::Start => {
                replies.push(prompts::ABUSE_TYPE_MENU.to_string());
                self.transition(ReportState::AwaitingAbuseType);
            }
            ReportState::AwaitingAbuseType => self.on_abuse_type(text, &mut replies),
            ReportState::AwaitingAdditionalContext => {
                self.additional_context = Some(text.to_string());
                self.transition(ReportState::AwaitingSubmission);
            }
            ReportState::AwaitingGroupId => self.on_group_id(text, &mut replies),
            ReportState::AwaitingPostCategory => self.on_post_category(text, &mut replies),
            ReportState::AwaitingContextMessage => {
                self.on_context_message(text, platform, &mut replies).await
            }
            ReportState::AwaitingThreatLevel => self.on_threat_level(text, &mut replies),
            ReportState::AwaitingGroupLocation => self.on_group_location(text, &mut replies),
            ReportState::AwaitingLoop => self.on_loop(text, &mut replies),
            // Submission is finalized below, in the turn that reaches it.
            ReportState::AwaitingSubmission | ReportState::Complete => {}
        }

        let records = if self.state == ReportState::AwaitingSubmission {
            self.submit(&mut replies)
        } else {
            None
        };

        ReportOutcome { replies, records }
    }

    fn transition(&mut self, target: ReportState) {
        debug_assert!(
            self.state.can_transition_to(target),
            "invalid report transition {} -> {}",
            self.state,
            target
        );
        debug!(session = %self.id, from = %self.state, to = %target, "Report transition");
        self.state = target;
    }

    fn reprompt(&self, replies: &mut Vec<String>, text: impl Into<String>) {
        debug!(session = %self.id, state = %self.state, "Invalid reporter input, re-prompting");
        replies.push(text.into());
    }

    fn cancel(&mut self) -> ReportOutcome {
        info!(
            session = %self.id,
            reporter = self.reporter,
            state = %self.state,
            discarded = self.completed.len(),
            "Report cancelled"
        );
        self.completed.clear();
        self.record = TriageRecord::new();
        self.transition(ReportState::Complete);
        ReportOutcome {
            replies: vec![prompts::CANCELLED.to_string()],
            records: None,
        }
    }

    fn on_abuse_type(&mut self, text: &str, replies: &mut Vec<String>) {
        let Some(abuse_type) = parse_menu_option(text).and_then(AbuseType::from_menu_option)
        else {
            return self.reprompt(replies, prompts::ABUSE_TYPE_INVALID);
        };

        self.abuse_type = Some(abuse_type);
        if abuse_type.is_structured() {
            replies.push(prompts::GROUP_ID_PROMPT.to_string());
            self.transition(ReportState::AwaitingGroupId);
        } else {
            replies.push(prompts::ADDITIONAL_CONTEXT_PROMPT.to_string());
            self.transition(ReportState::AwaitingAdditionalContext);
        }
    }

    fn on_group_id(&mut self, text: &str, replies: &mut Vec<String>) {
        let lower = text.to_lowercase();
        let organization = if let Some(caps) = KNOWN_GROUP_RE.captures(&lower) {
            Some(caps[1].trim().to_string())
        } else {
            match lower.as_str() {
                "usa" | "intl" => Some(lower.clone()),
                "unknown" => None,
                _ => return self.reprompt(replies, prompts::GROUP_ID_INVALID),
            }
        };

        self.record.organization_name = organization;
        replies.push(prompts::category_menu());
        self.transition(ReportState::AwaitingPostCategory);
    }

    fn on_post_category(&mut self, text: &str, replies: &mut Vec<String>) {
        let Some(category) = parse_menu_option(text).and_then(AbuseCategory::from_menu_option)
        else {
            return self.reprompt(replies, prompts::category_invalid());
        };

        self.record.category = Some(category);
        replies.push(prompts::CONTEXT_PROMPT.to_string());
        self.transition(ReportState::AwaitingContextMessage);
    }

    async fn on_context_message(
        &mut self,
        text: &str,
        platform: &dyn ChatPlatform,
        replies: &mut Vec<String>,
    ) {
        let message = match resolve_link(platform, text).await {
            Ok(message) => message,
            Err(e) => {
                debug!(session = %self.id, error = %e, "Could not resolve reported message");
                return self.reprompt(replies, e.user_message());
            }
        };

        replies.push(prompts::FOUND_MESSAGE.to_string());
        replies.push(prompts::quote_message(&message.author.name, &message.content));
        replies.push(prompts::THREAT_LEVEL_PROMPT.to_string());

        self.record.context = Some(text.to_string());
        self.record.suspect = Some(message.author.name);
        self.record.post_content = Some(message.content);
        self.transition(ReportState::AwaitingThreatLevel);
    }

    fn on_threat_level(&mut self, text: &str, replies: &mut Vec<String>) {
        match text.to_lowercase().as_str() {
            "y" | "yes" => {
                self.record.urgent = Some(true);
                replies.push(prompts::LOCATION_PROMPT.to_string());
                self.transition(ReportState::AwaitingGroupLocation);
            }
            "n" | "no" => {
                self.record.urgent = Some(false);
                replies.push(prompts::LOOP_PROMPT.to_string());
                self.transition(ReportState::AwaitingLoop);
            }
            _ => self.reprompt(replies, prompts::THREAT_LEVEL_INVALID),
        }
    }

    fn on_group_location(&mut self, text: &str, replies: &mut Vec<String>) {
        if text.eq_ignore_ascii_case("unknown") {
            replies.push(prompts::LOOP_PROMPT.to_string());
            return self.transition(ReportState::AwaitingLoop);
        }

        let parsed = LOCATION_RE.captures(text).and_then(|caps| {
            let size = caps[2].parse::<u32>().ok()?;
            Some((caps[1].to_string(), size))
        });
        let Some((location, size)) = parsed else {
            return self.reprompt(replies, prompts::LOCATION_INVALID);
        };

        self.record.location = Some(location);
        self.record.size = Some(size);
        replies.push(prompts::LOOP_PROMPT.to_string());
        self.transition(ReportState::AwaitingLoop);
    }

    fn on_loop(&mut self, text: &str, replies: &mut Vec<String>) {
        match text.to_lowercase().as_str() {
            "y" | "yes" => {
                let next = self.record.next_for_same_group();
                self.completed.push(std::mem::replace(&mut self.record, next));
                replies.push(prompts::category_menu());
                self.transition(ReportState::AwaitingPostCategory);
            }
            "n" | "no" => {
                let next = self.record.next_for_same_group();
                self.completed.push(std::mem::replace(&mut self.record, next));
                self.transition(ReportState::AwaitingSubmission);
            }
            _ => self.reprompt(replies, prompts::LOOP_INVALID),
        }
    }

    /// Finalize: hand the accumulated records to the caller exactly once.
    fn submit(&mut self, replies: &mut Vec<String>) -> Option<Vec<TriageRecord>> {
        let records = std::mem::take(&mut self.completed);
        self.transition(ReportState::Complete);

        if records.is_empty() {
            info!(
                session = %self.id,
                reporter = self.reporter,
                abuse_type = ?self.abuse_type,
                context = self.additional_context.as_deref().unwrap_or(""),
                "Unstructured report received"
            );
            replies.push(prompts::ADDITIONAL_CONTEXT_SUBMITTED.to_string());
            return None;
        }

        info!(
            session = %self.id,
            reporter = self.reporter,
            count = records.len(),
            "Report submitted"
        );
        replies.push(prompts::submitted(records.len()));
        Some(records)
    }
}
