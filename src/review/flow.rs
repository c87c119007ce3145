//! ReviewSession — one moderator working through a queue.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::continuation::Continuation;
use super::prompts;
use super::state::{Decision, ReviewMode, ReviewState};
use crate::classifier::{ClassifierGateway, SuspensionLength, Verdict};
use crate::platform::UserId;
use crate::triage::{ReviewItem, TriageQueues};

/// What happens to an item whose review is abandoned before a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewCancelPolicy {
    /// Put it back at the head of the queue it came from.
    #[default]
    Restore,
    /// Discard it.
    Drop,
}

impl FromStr for ReviewCancelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "restore" => Ok(Self::Restore),
            "drop" => Ok(Self::Drop),
            other => Err(format!("expected `restore` or `drop`, got `{other}`")),
        }
    }
}

/// Input to the review dialogue, already classified by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewInput<'a> {
    /// One of the four review keywords.
    Dispatch(ReviewMode),
    Cancel,
    Text(&'a str),
}

/// What one turn produced.
#[derive(Debug, Default)]
pub struct ReviewOutcome {
    pub replies: Vec<String>,
    /// Decisions taken this turn, in order.
    pub decisions: Vec<(Uuid, Decision)>,
}

/// Everything a turn needs besides the input.
pub struct ReviewContext<'a> {
    pub queues: &'a Arc<TriageQueues>,
    pub classifier: &'a dyn ClassifierGateway,
}

/// One moderator's review dialogue.
pub struct ReviewSession {
    id: Uuid,
    moderator: UserId,
    state: ReviewState,
    mode: ReviewMode,
    /// Item popped from a queue and not yet decided.
    current: Option<ReviewItem>,
    cancel_policy: ReviewCancelPolicy,
}

impl ReviewSession {
    pub fn new(moderator: UserId, mode: ReviewMode, cancel_policy: ReviewCancelPolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            moderator,
            state: ReviewState::Dispatch,
            mode,
            current: None,
            cancel_policy,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn moderator(&self) -> UserId {
        self.moderator
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn mode(&self) -> ReviewMode {
        self.mode
    }

    pub fn current(&self) -> Option<&ReviewItem> {
        self.current.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    /// Process one message from the moderator.
    pub async fn handle_message(
        &mut self,
        input: ReviewInput<'_>,
        ctx: &ReviewContext<'_>,
    ) -> ReviewOutcome {
        let mut out = ReviewOutcome::default();
        if self.is_complete() {
            return out;
        }

        let text = match input {
            ReviewInput::Dispatch(mode) => {
                self.dispatch(mode, ctx, &mut out).await;
                return out;
            }
            ReviewInput::Cancel => {
                self.abandon_current(ctx).await;
                out.replies.push(prompts::CANCELLED.to_string());
                info!(session = %self.id, moderator = self.moderator, "Review cancelled");
                self.transition(ReviewState::Complete);
                return out;
            }
            ReviewInput::Text(text) => text.trim().to_lowercase(),
        };

        match self.state {
            // Waiting for a keyword; free text is ignored.
            ReviewState::Dispatch => {}
            ReviewState::CheckUrgency => {
                if text == "yes" {
                    out.replies.push(prompts::REPORT_AUTHORITIES.to_string());
                    self.transition(ReviewState::ReportAuthorities);
                } else {
                    out.replies.push(prompts::SUSPENSION_MENU.to_string());
                    self.transition(ReviewState::DetermineSuspensionDuration);
                }
            }
            ReviewState::ReportAuthorities => match text.as_str() {
                "yes" => {
                    self.transition(ReviewState::SubmitReport);
                    out.replies.push(prompts::AUTHORITIES_SUBMITTED.to_string());
                    self.decide(Decision::Escalated, ctx, &mut out).await;
                }
                "no" => {
                    out.replies.push(prompts::NO_ESCALATION.to_string());
                    self.decide(Decision::NoAction, ctx, &mut out).await;
                }
                _ => self.reprompt(&mut out, prompts::REPORT_AUTHORITIES_INVALID),
            },
            ReviewState::DetermineSuspensionDuration => {
                let decision = match text.as_str() {
                    "1" => Decision::Suspended(SuspensionLength::Days(1)),
                    "2" => Decision::Suspended(SuspensionLength::Days(7)),
                    "3" => Decision::Suspended(SuspensionLength::Days(30)),
                    "4" => Decision::Suspended(SuspensionLength::Indefinite),
                    "5" => Decision::NoAction,
                    _ => return self.reprompt_outcome(out, prompts::SUSPENSION_INVALID),
                };
                out.replies.push(match decision {
                    Decision::Suspended(length) => length.decision_message(),
                    _ => prompts::NO_SUSPENSION.to_string(),
                });
                self.decide(decision, ctx, &mut out).await;
            }
            ReviewState::FinalDecision => match text.as_str() {
                "yes" | "y" => self.dispatch(self.mode, ctx, &mut out).await,
                "no" | "n" => {
                    out.replies.push(prompts::COMPLETED.to_string());
                    self.finish();
                }
                _ => self.reprompt(&mut out, prompts::ANOTHER_INVALID),
            },
            ReviewState::SubmitReport | ReviewState::Complete => {}
        }

        out
    }

    /// Pop the next item for `mode` and start on it.
    async fn dispatch(
        &mut self,
        mode: ReviewMode,
        ctx: &ReviewContext<'_>,
        out: &mut ReviewOutcome,
    ) {
        self.abandon_current(ctx).await;
        self.transition(ReviewState::Dispatch);
        self.mode = mode;

        let Some(item) = ctx.queues.next(mode.source).await else {
            info!(session = %self.id, mode = %mode, "Review requested on an empty queue");
            out.replies.push(prompts::empty_queue(mode.source).to_string());
            self.finish();
            return;
        };

        info!(
            session = %self.id,
            moderator = self.moderator,
            record_id = %item.id(),
            mode = %mode,
            "Reviewing item"
        );
        let summary = item.summary();
        out.replies.push(prompts::reviewing(&summary));
        self.current = Some(item);

        if !mode.assisted {
            out.replies.push(prompts::CHECK_URGENCY.to_string());
            self.transition(ReviewState::CheckUrgency);
            return;
        }

        match ctx.classifier.review(&summary).await {
            Ok(Verdict::Escalate) => {
                out.replies.push(prompts::ESCALATED.to_string());
                self.decide(Decision::Escalated, ctx, out).await;
            }
            Ok(Verdict::Suspend(length)) => {
                out.replies.push(length.decision_message());
                self.decide(Decision::Suspended(length), ctx, out).await;
            }
            Ok(Verdict::Unrecognized(raw)) => {
                warn!(
                    session = %self.id,
                    verdict = %raw,
                    "Unrecognized classifier verdict, switching to manual review"
                );
                self.fall_back_to_manual(out, &format!("unrecognized answer `{raw}`"));
            }
            Err(e) => {
                warn!(
                    session = %self.id,
                    error = %e,
                    "Classifier call failed, switching to manual review"
                );
                self.fall_back_to_manual(out, "the classifier is unavailable");
            }
        }
    }

    fn fall_back_to_manual(&mut self, out: &mut ReviewOutcome, detail: &str) {
        self.mode = self.mode.unassisted();
        out.replies.push(prompts::classifier_fallback(detail));
        out.replies.push(prompts::CHECK_URGENCY.to_string());
        self.transition(ReviewState::CheckUrgency);
    }

    /// Record the decision on the current item and run the continuation gate.
    async fn decide(
        &mut self,
        decision: Decision,
        ctx: &ReviewContext<'_>,
        out: &mut ReviewOutcome,
    ) {
        if let Some(item) = self.current.take() {
            info!(
                session = %self.id,
                moderator = self.moderator,
                record_id = %item.id(),
                decision = %decision,
                "Review decision"
            );
            out.decisions.push((item.id(), decision));
        }
        self.transition(ReviewState::FinalDecision);

        let remaining = ctx.queues.len(self.mode.source).await;
        match Continuation::decide(self.mode, remaining) {
            Continuation::OfferAnother { remaining } => {
                out.replies.push(prompts::offer_another(remaining));
            }
            Continuation::Finish { remaining } => {
                if remaining > 0 {
                    out.replies.push(prompts::remaining_after_assisted(remaining, self.mode));
                } else if !self.mode.assisted {
                    out.replies.push(prompts::NO_MORE_REPORTS.to_string());
                }
                out.replies.push(prompts::COMPLETED.to_string());
                self.finish();
            }
        }
    }

    /// Apply the cancel policy to an item popped but not decided.
    async fn abandon_current(&mut self, ctx: &ReviewContext<'_>) {
        let Some(item) = self.current.take() else {
            return;
        };
        match self.cancel_policy {
            ReviewCancelPolicy::Restore => ctx.queues.restore(item).await,
            ReviewCancelPolicy::Drop => {
                warn!(
                    session = %self.id,
                    record_id = %item.id(),
                    "Dropping item abandoned mid-review"
                );
            }
        }
    }

    fn finish(&mut self) {
        self.transition(ReviewState::Complete);
        debug!(session = %self.id, "Review session finished");
    }

    fn transition(&mut self, target: ReviewState) {
        debug_assert!(
            self.state.can_transition_to(target),
            "invalid review transition {} -> {}",
            self.state,
            target
        );
        debug!(session = %self.id, from = %self.state, to = %target, "Review transition");
        self.state = target;
    }

    fn reprompt(&self, out: &mut ReviewOutcome, text: &str) {
        debug!(session = %self.id, state = %self.state, "Invalid moderator input, re-prompting");
        out.replies.push(text.to_string());
    }

    fn reprompt_outcome(&self, mut out: ReviewOutcome, text: &str) -> ReviewOutcome {
        self.reprompt(&mut out, text);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::triage::{AbuseCategory, AutoDetectedRecord, QueueKind, TriageRecord};
    use async_trait::async_trait;

    /// Classifier returning a canned answer for every call.
    struct CannedClassifier(Result<&'static str, ()>);

    #[async_trait]
    impl ClassifierGateway for CannedClassifier {
        async fn classify(&self, _: &str, _: &str, _: &str) -> Result<String, LlmError> {
            self.0.map(str::to_string).map_err(|_| LlmError::RequestFailed {
                provider: "canned".into(),
                reason: "offline".into(),
            })
        }
    }

    fn record(org: &str) -> TriageRecord {
        TriageRecord {
            organization_name: Some(org.to_string()),
            category: Some(AbuseCategory::Threat),
            urgent: Some(false),
            ..TriageRecord::new()
        }
    }

    async fn queues_with(orgs: &[&str]) -> (Arc<TriageQueues>, Vec<Uuid>) {
        let queues = TriageQueues::new();
        let records: Vec<_> = orgs.iter().map(|o| record(o)).collect();
        let ids = records.iter().map(|r| r.id).collect();
        queues.submit_reports(records).await;
        (queues, ids)
    }

    async fn turn(
        session: &mut ReviewSession,
        input: ReviewInput<'_>,
        queues: &Arc<TriageQueues>,
        classifier: &dyn ClassifierGateway,
    ) -> ReviewOutcome {
        let ctx = ReviewContext { queues, classifier };
        session.handle_message(input, &ctx).await
    }

    fn new_session(mode: ReviewMode) -> ReviewSession {
        ReviewSession::new(9, mode, ReviewCancelPolicy::Restore)
    }

    #[tokio::test]
    async fn empty_queues_finish_immediately() {
        let queues = TriageQueues::new();
        let classifier = CannedClassifier(Ok("Immediate threat"));
        for (mode, expected) in [
            (ReviewMode::MANUAL, "No reports to review."),
            (ReviewMode::MANUAL_ASSISTED, "No reports to review."),
            (ReviewMode::DETECTED, "No automated reports to review."),
            (ReviewMode::DETECTED_ASSISTED, "No automated reports to review."),
        ] {
            let mut session = new_session(mode);
            let out = turn(&mut session, ReviewInput::Dispatch(mode), &queues, &classifier).await;
            assert_eq!(out.replies, vec![expected.to_string()]);
            assert!(session.is_complete());
        }
    }

    #[tokio::test]
    async fn manual_review_escalation_path() {
        let (queues, ids) = queues_with(&["isis"]).await;
        let classifier = CannedClassifier(Err(()));
        let mut session = new_session(ReviewMode::MANUAL);

        let out = turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL),
            &queues,
            &classifier,
        )
        .await;
        assert!(out.replies[0].contains("isis"));
        assert_eq!(out.replies[1], prompts::CHECK_URGENCY);
        assert_eq!(session.state(), ReviewState::CheckUrgency);
        assert!(queues.manual.is_empty().await);

        turn(&mut session, ReviewInput::Text("YES"), &queues, &classifier).await;
        assert_eq!(session.state(), ReviewState::ReportAuthorities);

        let out = turn(&mut session, ReviewInput::Text("yes"), &queues, &classifier).await;
        assert_eq!(out.decisions, vec![(ids[0], Decision::Escalated)]);
        assert!(out.replies.contains(&prompts::AUTHORITIES_SUBMITTED.to_string()));
        assert!(out.replies.contains(&prompts::NO_MORE_REPORTS.to_string()));
        assert!(session.is_complete());
    }

    #[tokio::test]
    async fn declining_authorities_passes_the_gate_without_escalation() {
        let (queues, ids) = queues_with(&["a", "b"]).await;
        let classifier = CannedClassifier(Err(()));
        let mut session = new_session(ReviewMode::MANUAL);

        turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL),
            &queues,
            &classifier,
        )
        .await;
        turn(&mut session, ReviewInput::Text("yes"), &queues, &classifier).await;

        let out = turn(&mut session, ReviewInput::Text("maybe"), &queues, &classifier).await;
        assert_eq!(out.replies, vec![prompts::REPORT_AUTHORITIES_INVALID.to_string()]);
        assert_eq!(session.state(), ReviewState::ReportAuthorities);

        let out = turn(&mut session, ReviewInput::Text("no"), &queues, &classifier).await;
        assert_eq!(out.decisions, vec![(ids[0], Decision::NoAction)]);
        assert_eq!(session.state(), ReviewState::FinalDecision);
        assert_eq!(out.replies.last().unwrap(), &prompts::offer_another(1));
    }

    #[tokio::test]
    async fn suspension_menu_maps_options() {
        let expected = [
            ("1", "User suspended for 1 day."),
            ("2", "User suspended for 7 days."),
            ("3", "User suspended for 30 days."),
            ("4", "User suspended indefinitely."),
            ("5", prompts::NO_SUSPENSION),
        ];
        let classifier = CannedClassifier(Err(()));
        for (option, message) in expected {
            let (queues, _) = queues_with(&["x"]).await;
            let mut session = new_session(ReviewMode::MANUAL);
            turn(
                &mut session,
                ReviewInput::Dispatch(ReviewMode::MANUAL),
                &queues,
                &classifier,
            )
            .await;
            turn(&mut session, ReviewInput::Text("no"), &queues, &classifier).await;
            assert_eq!(session.state(), ReviewState::DetermineSuspensionDuration);

            let out = turn(&mut session, ReviewInput::Text("6"), &queues, &classifier).await;
            assert_eq!(out.replies, vec![prompts::SUSPENSION_INVALID.to_string()]);

            let out = turn(&mut session, ReviewInput::Text(option), &queues, &classifier).await;
            assert_eq!(out.replies[0], message);
            assert_eq!(out.decisions.len(), 1);
            assert!(session.is_complete());
        }
    }

    #[tokio::test]
    async fn manual_reviews_loop_in_fifo_order() {
        let (queues, ids) = queues_with(&["r1", "r2", "r3"]).await;
        let classifier = CannedClassifier(Err(()));
        let mut session = new_session(ReviewMode::MANUAL);
        let mut decided = Vec::new();

        let out = turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL),
            &queues,
            &classifier,
        )
        .await;
        assert!(out.replies[0].contains("r1"));
        for expected in ["r2", "r3"] {
            turn(&mut session, ReviewInput::Text("no"), &queues, &classifier).await;
            let out = turn(&mut session, ReviewInput::Text("1"), &queues, &classifier).await;
            decided.extend(out.decisions);
            let out = turn(&mut session, ReviewInput::Text("yes"), &queues, &classifier).await;
            assert!(out.replies[0].contains(expected));
        }
        turn(&mut session, ReviewInput::Text("no"), &queues, &classifier).await;
        let out = turn(&mut session, ReviewInput::Text("1"), &queues, &classifier).await;
        decided.extend(out.decisions);

        let order: Vec<Uuid> = decided.iter().map(|(id, _)| *id).collect();
        assert_eq!(order, ids);
        assert!(session.is_complete());
    }

    #[tokio::test]
    async fn final_decision_no_ends_session() {
        let (queues, _) = queues_with(&["a", "b"]).await;
        let classifier = CannedClassifier(Err(()));
        let mut session = new_session(ReviewMode::MANUAL);
        turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL),
            &queues,
            &classifier,
        )
        .await;
        turn(&mut session, ReviewInput::Text("no"), &queues, &classifier).await;
        turn(&mut session, ReviewInput::Text("5"), &queues, &classifier).await;

        let out = turn(&mut session, ReviewInput::Text("no"), &queues, &classifier).await;
        assert_eq!(out.replies, vec![prompts::COMPLETED.to_string()]);
        assert!(session.is_complete());
        assert_eq!(queues.manual.len().await, 1);
    }

    #[tokio::test]
    async fn unclear_answer_to_another_review_reprompts() {
        let (queues, _) = queues_with(&["a", "b"]).await;
        let classifier = CannedClassifier(Err(()));
        let mut session = new_session(ReviewMode::MANUAL);
        turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL),
            &queues,
            &classifier,
        )
        .await;
        turn(&mut session, ReviewInput::Text("no"), &queues, &classifier).await;
        turn(&mut session, ReviewInput::Text("5"), &queues, &classifier).await;
        assert_eq!(session.state(), ReviewState::FinalDecision);

        let out = turn(&mut session, ReviewInput::Text("maybe"), &queues, &classifier).await;
        assert_eq!(out.replies, vec![prompts::ANOTHER_INVALID.to_string()]);
        assert_eq!(session.state(), ReviewState::FinalDecision);
        assert!(!session.is_complete());
        assert_eq!(queues.manual.len().await, 1);

        let out = turn(&mut session, ReviewInput::Text("Yes"), &queues, &classifier).await;
        assert!(out.replies[0].contains("**Organization:** b"));
        assert_eq!(session.state(), ReviewState::CheckUrgency);
    }

    #[tokio::test]
    async fn immediate_threat_escalates_in_every_assisted_mode() {
        let classifier = CannedClassifier(Ok("Immediate threat"));
        for mode in [ReviewMode::MANUAL_ASSISTED, ReviewMode::DETECTED_ASSISTED] {
            let (queues, _) = queues_with(&["a"]).await;
            queues
                .submit_detection(AutoDetectedRecord::new("post", 1, "mallory", "group-31"))
                .await;
            let mut session = new_session(mode);
            let out = turn(&mut session, ReviewInput::Dispatch(mode), &queues, &classifier).await;
            assert!(out.replies.contains(&prompts::ESCALATED.to_string()), "{mode}");
            assert_eq!(out.decisions[0].1, Decision::Escalated);
            assert!(session.is_complete());
        }
    }

    #[tokio::test]
    async fn suspension_verdicts_produce_decision_lines() {
        for (answer, line) in [
            ("30 days suspension", "User suspended for 30 days."),
            ("1 day suspension", "User suspended for 1 day."),
            ("Indefinite suspension", "User suspended indefinitely."),
        ] {
            let classifier = CannedClassifier(Ok(answer));
            let (queues, _) = queues_with(&["a"]).await;
            let mut session = new_session(ReviewMode::MANUAL_ASSISTED);
            let out = turn(
                &mut session,
                ReviewInput::Dispatch(ReviewMode::MANUAL_ASSISTED),
                &queues,
                &classifier,
            )
            .await;
            assert!(out.replies.contains(&line.to_string()), "{answer}");
            assert!(session.is_complete());
        }
    }

    #[tokio::test]
    async fn assisted_review_reports_remaining_items() {
        let classifier = CannedClassifier(Ok("7 days suspension"));
        let (queues, _) = queues_with(&["a", "b", "c"]).await;
        let mut session = new_session(ReviewMode::MANUAL_ASSISTED);
        let out = turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL_ASSISTED),
            &queues,
            &classifier,
        )
        .await;
        assert!(out
            .replies
            .contains(&prompts::remaining_after_assisted(2, ReviewMode::MANUAL_ASSISTED)));
        assert!(session.is_complete());
    }

    #[tokio::test]
    async fn unusable_verdict_falls_back_to_manual() {
        for classifier in [CannedClassifier(Ok("I am not sure")), CannedClassifier(Err(()))] {
            let (queues, ids) = queues_with(&["a"]).await;
            let mut session = new_session(ReviewMode::MANUAL_ASSISTED);
            let out = turn(
                &mut session,
                ReviewInput::Dispatch(ReviewMode::MANUAL_ASSISTED),
                &queues,
                &classifier,
            )
            .await;
            assert_eq!(out.replies.last().unwrap(), prompts::CHECK_URGENCY);
            assert_eq!(session.state(), ReviewState::CheckUrgency);
            assert_eq!(session.mode(), ReviewMode::MANUAL);
            assert_eq!(session.current().map(ReviewItem::id), Some(ids[0]));
            assert!(out.decisions.is_empty());
        }
    }

    #[tokio::test]
    async fn cancel_restores_item_to_head() {
        let (queues, ids) = queues_with(&["a", "b"]).await;
        let classifier = CannedClassifier(Err(()));
        let mut session = new_session(ReviewMode::MANUAL);
        turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL),
            &queues,
            &classifier,
        )
        .await;
        turn(&mut session, ReviewInput::Text("no"), &queues, &classifier).await;

        let out = turn(&mut session, ReviewInput::Cancel, &queues, &classifier).await;
        assert_eq!(out.replies, vec![prompts::CANCELLED.to_string()]);
        assert!(session.is_complete());
        assert_eq!(queues.manual.len().await, 2);
        assert_eq!(queues.next(QueueKind::Manual).await.map(|i| i.id()), Some(ids[0]));
    }

    #[tokio::test]
    async fn cancel_with_drop_policy_discards_item() {
        let (queues, ids) = queues_with(&["a", "b"]).await;
        let classifier = CannedClassifier(Err(()));
        let mut session = ReviewSession::new(9, ReviewMode::MANUAL, ReviewCancelPolicy::Drop);
        turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL),
            &queues,
            &classifier,
        )
        .await;
        turn(&mut session, ReviewInput::Cancel, &queues, &classifier).await;

        assert_eq!(queues.manual.len().await, 1);
        assert_eq!(queues.next(QueueKind::Manual).await.map(|i| i.id()), Some(ids[1]));
    }

    #[tokio::test]
    async fn redispatch_mid_item_applies_cancel_policy() {
        let (queues, ids) = queues_with(&["a"]).await;
        queues
            .submit_detection(AutoDetectedRecord::new("post", 1, "mallory", "group-31"))
            .await;
        let classifier = CannedClassifier(Err(()));
        let mut session = new_session(ReviewMode::MANUAL);
        turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::MANUAL),
            &queues,
            &classifier,
        )
        .await;

        let out = turn(
            &mut session,
            ReviewInput::Dispatch(ReviewMode::DETECTED),
            &queues,
            &classifier,
        )
        .await;
        assert!(out.replies[0].contains("Automated flag"));
        assert_eq!(session.mode(), ReviewMode::DETECTED);
        assert_eq!(queues.manual.len().await, 1);
        assert_eq!(queues.next(QueueKind::Manual).await.map(|i| i.id()), Some(ids[0]));
    }

    #[test]
    fn cancel_policy_parses() {
        assert_eq!("restore".parse::<ReviewCancelPolicy>(), Ok(ReviewCancelPolicy::Restore));
        assert_eq!(" DROP ".parse::<ReviewCancelPolicy>(), Ok(ReviewCancelPolicy::Drop));
        assert!("keep".parse::<ReviewCancelPolicy>().is_err());
    }
}
