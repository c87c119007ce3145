//! Channel router — the single entry point for inbound messages.
//!
//! - **DMs** go to the sender's reporter session, or start one on `report`.
//! - **Moderator channel** messages go to the sender's review session, or
//!   start one on a review keyword.
//! - **Monitored channel** messages are auto-scanned by the classifier; hits
//!   are queued for review and announced in the guild's moderator channel.
//!   That channel is looked up by name on the platform the first time a
//!   guild needs it.
//!
//! One message is processed to completion before the next is taken.

pub mod commands;

pub use commands::{ModeratorCommand, ReporterCommand};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::classifier::ClassifierGateway;
use crate::config::RouterConfig;
use crate::error::Error;
use crate::platform::{ChannelRef, ChatPlatform, GuildId, InboundMessage, MessageSource};
use crate::report::{self, ReportInput, ReportSession};
use crate::review::{self, ReviewContext, ReviewInput, ReviewSession};
use crate::session::{SessionKind, SessionRegistry};
use crate::triage::{AutoDetectedRecord, ThreatLevel, TriageQueues};

/// Routes inbound messages to sessions and the auto-scan.
pub struct ChannelRouter {
    config: RouterConfig,
    platform: Arc<dyn ChatPlatform>,
    classifier: Arc<dyn ClassifierGateway>,
    queues: Arc<TriageQueues>,
    reports: SessionRegistry<ReportSession>,
    reviews: SessionRegistry<ReviewSession>,
    /// Where threat alerts go, per guild.
    mod_channels: HashMap<GuildId, ChannelRef>,
}

impl ChannelRouter {
    pub fn new(
        config: RouterConfig,
        platform: Arc<dyn ChatPlatform>,
        classifier: Arc<dyn ClassifierGateway>,
        queues: Arc<TriageQueues>,
    ) -> Self {
        Self {
            config,
            platform,
            classifier,
            queues,
            reports: SessionRegistry::new(SessionKind::Reporter),
            reviews: SessionRegistry::new(SessionKind::Moderator),
            mod_channels: HashMap::new(),
        }
    }

    pub fn queues(&self) -> &Arc<TriageQueues> {
        &self.queues
    }

    /// Number of open reporter and moderator sessions.
    pub fn active_sessions(&self) -> (usize, usize) {
        (self.reports.len(), self.reviews.len())
    }

    /// Set the moderator channel for a guild.
    pub fn register_mod_channel(&mut self, guild_id: GuildId, channel: ChannelRef) {
        info!(guild_id, channel = %channel, "Moderator channel registered");
        self.mod_channels.insert(guild_id, channel);
    }

    pub fn mod_channel(&self, guild_id: GuildId) -> Option<&ChannelRef> {
        self.mod_channels.get(&guild_id)
    }

    /// Process one inbound message.
    pub async fn route(&mut self, msg: &InboundMessage) -> Result<(), Error> {
        if self.config.bot_user_id == Some(msg.author.id) {
            debug!(message_id = msg.id, "Ignoring own message");
            return Ok(());
        }

        match &msg.source {
            MessageSource::Direct => self.handle_dm(msg).await,
            MessageSource::Guild {
                guild_id,
                channel_name,
                ..
            } => {
                if *channel_name == self.config.mod_channel {
                    if !self.mod_channels.contains_key(guild_id) {
                        self.register_mod_channel(*guild_id, msg.reply_to());
                    }
                    self.handle_moderator(msg).await
                } else if *channel_name == self.config.monitored_channel {
                    self.auto_scan(msg, *guild_id, channel_name).await
                } else {
                    Ok(())
                }
            }
        }
    }

    async fn handle_dm(&mut self, msg: &InboundMessage) -> Result<(), Error> {
        let reporter = msg.author.id;
        let command = ReporterCommand::parse(&msg.content);

        if command == ReporterCommand::Help {
            return self.send(&msg.reply_to(), &[report::prompts::HELP.to_string()]).await;
        }
        if !self.reports.contains(reporter) {
            if command != ReporterCommand::Start {
                return Ok(());
            }
            self.reports.start(reporter, || ReportSession::new(reporter));
        }

        let input = match command {
            ReporterCommand::Cancel => ReportInput::Cancel,
            _ => ReportInput::Text(&msg.content),
        };
        let Some(session) = self.reports.get_mut(reporter) else {
            return Ok(());
        };
        let outcome = session.handle_message(input, self.platform.as_ref()).await;
        let complete = session.is_complete();

        if let Some(records) = outcome.records {
            let queued = self.queues.submit_reports(records).await;
            info!(reporter, queued, "Reporter records queued");
        }
        if complete {
            self.reports.finish(reporter);
        }

        self.send(&msg.reply_to(), &outcome.replies).await
    }

    async fn handle_moderator(&mut self, msg: &InboundMessage) -> Result<(), Error> {
        let moderator = msg.author.id;
        let command = ModeratorCommand::parse(&msg.content);

        if command == ModeratorCommand::Help {
            return self.send(&msg.reply_to(), &[review::prompts::HELP.to_string()]).await;
        }
        if !self.reviews.contains(moderator) {
            let ModeratorCommand::Review(mode) = command else {
                return Ok(());
            };
            let policy = self.config.cancel_policy;
            self.reviews
                .start(moderator, || ReviewSession::new(moderator, mode, policy));
        }

        let input = match command {
            ModeratorCommand::Review(mode) => ReviewInput::Dispatch(mode),
            ModeratorCommand::Cancel => ReviewInput::Cancel,
            ModeratorCommand::Text(text) => ReviewInput::Text(text),
            ModeratorCommand::Help => return Ok(()),
        };
        let Some(session) = self.reviews.get_mut(moderator) else {
            return Ok(());
        };
        let ctx = ReviewContext {
            queues: &self.queues,
            classifier: self.classifier.as_ref(),
        };
        let outcome = session.handle_message(input, &ctx).await;
        if session.is_complete() {
            self.reviews.finish(moderator);
        }

        self.send(&msg.reply_to(), &outcome.replies).await
    }

    async fn auto_scan(
        &mut self,
        msg: &InboundMessage,
        guild_id: GuildId,
        channel_name: &str,
    ) -> Result<(), Error> {
        let flagged = match self.classifier.scan(&msg.content).await {
            Ok(flagged) => flagged,
            Err(e) => {
                warn!(message_id = msg.id, error = %e, "Auto-scan failed");
                return Err(e.into());
            }
        };
        debug!(message_id = msg.id, flagged, "Auto-scan result");
        if !flagged {
            return Ok(());
        }

        let record = AutoDetectedRecord::new(&msg.content, msg.id, &msg.author.name, channel_name)
            .with_threat_level(ThreatLevel::Threatening);
        self.queues.submit_detection(record).await;

        let Some(target) = self.alert_target(guild_id).await else {
            warn!(
                guild_id,
                channel = %self.config.mod_channel,
                "No moderator channel found for guild"
            );
            return Ok(());
        };
        let alert = format!(
            "Threat detected: {}\nMessage ID: {}\nAuthor: {}\nChannel: {}",
            msg.content, msg.id, msg.author.name, channel_name
        );
        self.send(&target, &[alert]).await
    }

    /// The guild's moderator channel, looked up by name when not yet known.
    async fn alert_target(&mut self, guild_id: GuildId) -> Option<ChannelRef> {
        if let Some(target) = self.mod_channels.get(&guild_id) {
            return Some(target.clone());
        }
        match self
            .platform
            .find_channel(guild_id, &self.config.mod_channel)
            .await
        {
            Ok(Some(channel)) => {
                let target = channel.to_ref();
                self.register_mod_channel(guild_id, target.clone());
                Some(target)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(guild_id, error = %e, "Moderator channel lookup failed");
                None
            }
        }
    }

    async fn send(&self, target: &ChannelRef, replies: &[String]) -> Result<(), Error> {
        for reply in replies {
            if let Err(e) = self.platform.send_message(target, reply).await {
                error!(
                    platform = self.platform.name(),
                    target = %target,
                    error = %e,
                    "Failed to send reply"
                );
                return Err(e.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::platform::{Author, GuildChannel, MemoryPlatform};
    use crate::triage::QueueKind;
    use async_trait::async_trait;

    struct FixedClassifier(&'static str);

    #[async_trait]
    impl ClassifierGateway for FixedClassifier {
        async fn classify(&self, _: &str, _: &str, _: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    fn user(id: u64, name: &str) -> Author {
        Author {
            id,
            name: name.to_string(),
        }
    }

    type Setup = (ChannelRouter, Arc<MemoryPlatform>, GuildChannel, GuildChannel);

    async fn setup(answer: &'static str) -> Setup {
        let platform = Arc::new(MemoryPlatform::new());
        let monitored = platform.add_channel(1, "guild", 10, "group-31").await;
        let mods = platform.add_channel(1, "guild", 11, "group-31-mod").await;
        let mut config = RouterConfig::default();
        config.bot_user_id = Some(1);
        let router = ChannelRouter::new(
            config,
            platform.clone(),
            Arc::new(FixedClassifier(answer)),
            TriageQueues::new(),
        );
        (router, platform, monitored, mods)
    }

    #[tokio::test]
    async fn dm_without_session_needs_report_keyword() {
        let (mut router, platform, _, _) = setup("No").await;
        router
            .route(&InboundMessage::direct(1, user(5, "alice"), "hello"))
            .await
            .unwrap();
        assert!(platform.sent().await.is_empty());
        assert_eq!(router.active_sessions(), (0, 0));

        router
            .route(&InboundMessage::direct(2, user(5, "alice"), "report"))
            .await
            .unwrap();
        assert_eq!(router.active_sessions(), (1, 0));
        let replies = platform.sent_to(&ChannelRef::Direct { user_id: 5 }).await;
        assert_eq!(replies, vec![report::prompts::ABUSE_TYPE_MENU.to_string()]);
    }

    #[tokio::test]
    async fn help_is_answered_without_a_session() {
        let (mut router, platform, _, mods) = setup("No").await;
        router
            .route(&InboundMessage::direct(1, user(5, "alice"), "help"))
            .await
            .unwrap();
        router
            .route(&InboundMessage::in_channel(2, user(6, "mod"), "help", &mods))
            .await
            .unwrap();

        assert_eq!(
            platform.sent_to(&ChannelRef::Direct { user_id: 5 }).await,
            vec![report::prompts::HELP.to_string()]
        );
        assert_eq!(
            platform.sent_to(&mods.to_ref()).await,
            vec![review::prompts::HELP.to_string()]
        );
        assert_eq!(router.active_sessions(), (0, 0));
    }

    #[tokio::test]
    async fn own_messages_are_ignored() {
        let (mut router, platform, _, _) = setup("Yes").await;
        router
            .route(&InboundMessage::direct(1, user(1, "bot"), "report"))
            .await
            .unwrap();
        assert!(platform.sent().await.is_empty());
        assert_eq!(router.active_sessions(), (0, 0));
    }

    #[tokio::test]
    async fn flagged_message_is_queued_and_announced() {
        let (mut router, platform, monitored, mods) = setup("Yes").await;
        router
            .route(&InboundMessage::in_channel(1, user(6, "mod"), "hi", &mods))
            .await
            .unwrap();

        let msg = InboundMessage::in_channel(42, user(7, "mallory"), "attack tonight", &monitored);
        router.route(&msg).await.unwrap();

        assert_eq!(router.queues().len(QueueKind::Automated).await, 1);
        let alerts = platform.sent_to(&mods.to_ref()).await;
        let expected =
            "Threat detected: attack tonight\nMessage ID: 42\nAuthor: mallory\nChannel: group-31";
        assert_eq!(alerts, vec![expected.to_string()]);
    }

    #[tokio::test]
    async fn flag_before_any_moderator_message_still_alerts() {
        let (mut router, platform, monitored, mods) = setup("Yes").await;
        assert_eq!(router.mod_channel(1), None);

        router
            .route(&InboundMessage::in_channel(42, user(7, "mallory"), "attack", &monitored))
            .await
            .unwrap();

        assert_eq!(router.queues().len(QueueKind::Automated).await, 1);
        let alerts = platform.sent_to(&mods.to_ref()).await;
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].starts_with("Threat detected: attack"));
        assert_eq!(router.mod_channel(1), Some(&mods.to_ref()));
    }

    #[tokio::test]
    async fn flag_in_guild_without_mod_channel_is_still_queued() {
        let (mut router, platform, _, _) = setup("Yes").await;
        let elsewhere = platform.add_channel(2, "other", 20, "group-31").await;
        router
            .route(&InboundMessage::in_channel(42, user(7, "mallory"), "attack", &elsewhere))
            .await
            .unwrap();
        assert_eq!(router.queues().len(QueueKind::Automated).await, 1);
        assert!(platform.sent().await.is_empty());
    }

    #[tokio::test]
    async fn unflagged_and_other_channels_are_ignored() {
        let (mut router, platform, monitored, _) = setup("No").await;
        let other = platform.add_channel(1, "guild", 12, "general").await;
        router
            .route(&InboundMessage::in_channel(1, user(7, "a"), "hello", &monitored))
            .await
            .unwrap();
        router
            .route(&InboundMessage::in_channel(2, user(7, "a"), "review", &other))
            .await
            .unwrap();
        assert_eq!(router.queues().len(QueueKind::Automated).await, 0);
        assert_eq!(router.active_sessions(), (0, 0));
        assert!(platform.sent().await.is_empty());
    }

    #[tokio::test]
    async fn claude_review_on_empty_queue_finishes() {
        let (mut router, platform, _, mods) = setup("Immediate threat").await;
        router
            .route(&InboundMessage::in_channel(1, user(6, "mod"), "claude review", &mods))
            .await
            .unwrap();
        assert_eq!(
            platform.sent_to(&mods.to_ref()).await,
            vec!["No automated reports to review.".to_string()]
        );
        assert_eq!(router.active_sessions(), (0, 0));
    }

    #[tokio::test]
    async fn moderator_text_without_session_is_ignored() {
        let (mut router, platform, _, mods) = setup("No").await;
        router
            .route(&InboundMessage::in_channel(1, user(6, "mod"), "yes", &mods))
            .await
            .unwrap();
        assert!(platform.sent().await.is_empty());
        assert_eq!(router.mod_channel(1), Some(&mods.to_ref()));
    }
}
