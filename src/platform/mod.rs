//! Chat platform boundary.
//!
//! The pipeline never talks to the platform directly; it goes through the
//! `ChatPlatform` trait: send text to a channel, look up a guild, look up a
//! channel inside that guild (by id or by name), fetch a message by id.
//! Lookups return `Ok(None)` when the target does not exist.

pub mod discord;
pub mod link;
pub mod memory;

pub use discord::DiscordPlatform;
pub use link::{LinkError, MessageLink, resolve_link};
pub use memory::MemoryPlatform;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

pub type GuildId = u64;
pub type ChannelId = u64;
pub type MessageId = u64;
pub type UserId = u64;

/// Where a message is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelRef {
    /// Direct message with a user.
    Direct { user_id: UserId },
    /// A text channel in a guild.
    Guild {
        guild_id: GuildId,
        channel_id: ChannelId,
    },
}

impl std::fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct { user_id } => write!(f, "dm:{user_id}"),
            Self::Guild {
                guild_id,
                channel_id,
            } => write!(f, "{guild_id}/{channel_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildChannel {
    pub guild_id: GuildId,
    pub id: ChannelId,
    pub name: String,
}

impl GuildChannel {
    pub fn to_ref(&self) -> ChannelRef {
        ChannelRef::Guild {
            guild_id: self.guild_id,
            channel_id: self.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
}

/// A message fetched by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedMessage {
    pub id: MessageId,
    pub author: Author,
    pub content: String,
}

/// Where an inbound message was posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageSource {
    Direct,
    Guild {
        guild_id: GuildId,
        channel_id: ChannelId,
        channel_name: String,
    },
}

/// A message delivered to the router by an inbound channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: MessageId,
    pub author: Author,
    pub content: String,
    pub source: MessageSource,
}

impl InboundMessage {
    pub fn direct(id: MessageId, author: Author, content: impl Into<String>) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            source: MessageSource::Direct,
        }
    }

    pub fn in_channel(
        id: MessageId,
        author: Author,
        content: impl Into<String>,
        channel: &GuildChannel,
    ) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            source: MessageSource::Guild {
                guild_id: channel.guild_id,
                channel_id: channel.id,
                channel_name: channel.name.clone(),
            },
        }
    }

    /// Where replies to this message go: the DM for direct messages, the
    /// same channel otherwise.
    pub fn reply_to(&self) -> ChannelRef {
        match &self.source {
            MessageSource::Direct => ChannelRef::Direct {
                user_id: self.author.id,
            },
            MessageSource::Guild {
                guild_id,
                channel_id,
                ..
            } => ChannelRef::Guild {
                guild_id: *guild_id,
                channel_id: *channel_id,
            },
        }
    }
}

/// Operations the pipeline needs from the chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Platform name for logging (e.g. "discord").
    fn name(&self) -> &str;

    async fn send_message(&self, target: &ChannelRef, text: &str) -> Result<(), PlatformError>;

    async fn resolve_guild(&self, id: GuildId) -> Result<Option<Guild>, PlatformError>;

    async fn resolve_channel(
        &self,
        guild: &Guild,
        id: ChannelId,
    ) -> Result<Option<GuildChannel>, PlatformError>;

    /// First text channel in the guild with exactly this name.
    async fn find_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<GuildChannel>, PlatformError>;

    async fn fetch_message(
        &self,
        channel: &GuildChannel,
        id: MessageId,
    ) -> Result<Option<FetchedMessage>, PlatformError>;
}

/// Split text into chunks of at most `max_len` characters, preferring line
/// boundaries.
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > max_len && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > max_len {
            // A single line longer than the limit is hard-split.
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_len) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            id: 9,
            name: "alice".into(),
        }
    }

    #[test]
    fn dm_replies_go_to_author() {
        let msg = InboundMessage::direct(1, author(), "report");
        assert_eq!(msg.reply_to(), ChannelRef::Direct { user_id: 9 });
    }

    #[test]
    fn channel_replies_go_to_channel() {
        let channel = GuildChannel {
            guild_id: 5,
            id: 6,
            name: "group-31-mod".into(),
        };
        let msg = InboundMessage::in_channel(1, author(), "review", &channel);
        assert_eq!(msg.reply_to(), channel.to_ref());
    }

    #[test]
    fn short_message_is_not_split() {
        assert_eq!(split_message("hello", 2000), vec!["hello".to_string()]);
    }

    #[test]
    fn long_message_splits_on_lines() {
        let text = "aaaa\nbbbb\ncccc\n";
        let chunks = split_message(text, 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n".to_string(), "cccc\n".to_string()]);
    }

    #[test]
    fn overlong_line_is_hard_split() {
        let chunks = split_message("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }
}
