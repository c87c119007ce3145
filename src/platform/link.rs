//! Message links — `/<guild>/<channel>/<message>` embedded in free text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use super::{ChannelId, ChatPlatform, FetchedMessage, GuildId, MessageId};
use crate::error::PlatformError;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)/(\d+)/(\d+)").expect("link regex is valid"));

/// The three ids of a message link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLink {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

impl MessageLink {
    /// Find the first link anywhere in `text`.
    pub fn find_in(text: &str) -> Option<Self> {
        LINK_RE.captures_iter(text).find_map(|caps| {
            Some(Self {
                guild_id: caps[1].parse().ok()?,
                channel_id: caps[2].parse().ok()?,
                message_id: caps[3].parse().ok()?,
            })
        })
    }
}

/// Why a link could not be resolved to a message.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("no message link found")]
    Missing,

    #[error("guild {0} is not available")]
    UnknownGuild(GuildId),

    #[error("channel {0} does not exist")]
    UnknownChannel(ChannelId),

    #[error("message {0} does not exist")]
    MessageNotFound(MessageId),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl LinkError {
    /// Reply line shown to the user. Each ends with a way out.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Missing => {
                "I'm sorry, I couldn't find a message link in that. Please paste the link to the message and try again, or say `cancel` to cancel."
            }
            Self::UnknownGuild(_) => {
                "I cannot accept reports of messages from guilds that I'm not in. Please have the guild owner add me to the guild and try again."
            }
            Self::UnknownChannel(_) => {
                "It seems this channel was deleted or never existed. Please try again or say `cancel` to cancel."
            }
            Self::MessageNotFound(_) => {
                "It seems this message was deleted or never existed. Please try again or say `cancel` to cancel."
            }
            Self::Platform(_) => {
                "I couldn't reach the chat platform to look up that message. Please try again in a moment or say `cancel` to cancel."
            }
        }
    }
}

/// Find a link in `text` and resolve it guild → channel → message.
/// Stops at the first missing piece.
pub async fn resolve_link(
    platform: &dyn ChatPlatform,
    text: &str,
) -> Result<FetchedMessage, LinkError> {
    let link = MessageLink::find_in(text).ok_or(LinkError::Missing)?;

    let guild = platform
        .resolve_guild(link.guild_id)
        .await
        .inspect_err(|e| warn!(guild_id = link.guild_id, error = %e, "Guild lookup failed"))?
        .ok_or(LinkError::UnknownGuild(link.guild_id))?;

    let channel = platform
        .resolve_channel(&guild, link.channel_id)
        .await
        .inspect_err(|e| warn!(channel_id = link.channel_id, error = %e, "Channel lookup failed"))?
        .ok_or(LinkError::UnknownChannel(link.channel_id))?;

    platform
        .fetch_message(&channel, link.message_id)
        .await
        .inspect_err(|e| warn!(message_id = link.message_id, error = %e, "Message fetch failed"))?
        .ok_or(LinkError::MessageNotFound(link.message_id))
}
