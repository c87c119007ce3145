//! In-memory platform — backs the console mode and the tests.
//!
//! Guilds, channels and messages live in maps; sent messages are printed
//! (console mode) and recorded so callers can inspect them.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    Author, ChannelId, ChannelRef, ChatPlatform, FetchedMessage, Guild, GuildChannel, GuildId,
    InboundMessage, MessageId, MessageSource,
};
use crate::error::PlatformError;

#[derive(Default)]
struct Directory {
    guilds: HashMap<GuildId, Guild>,
    channels: HashMap<(GuildId, ChannelId), GuildChannel>,
    messages: HashMap<(ChannelId, MessageId), FetchedMessage>,
}

/// In-memory `ChatPlatform`.
pub struct MemoryPlatform {
    directory: RwLock<Directory>,
    sent: RwLock<Vec<(ChannelRef, String)>>,
    echo: bool,
}

impl MemoryPlatform {
    /// A silent platform (tests).
    pub fn new() -> Self {
        Self {
            directory: RwLock::new(Directory::default()),
            sent: RwLock::new(Vec::new()),
            echo: false,
        }
    }

    /// A platform that also prints every sent message to stdout.
    pub fn console() -> Self {
        Self {
            echo: true,
            ..Self::new()
        }
    }

    /// Register a channel (and its guild, if new).
    pub async fn add_channel(
        &self,
        guild_id: GuildId,
        guild_name: &str,
        channel_id: ChannelId,
        channel_name: &str,
    ) -> GuildChannel {
        let mut dir = self.directory.write().await;
        dir.guilds.entry(guild_id).or_insert_with(|| Guild {
            id: guild_id,
            name: guild_name.to_string(),
        });
        let channel = GuildChannel {
            guild_id,
            id: channel_id,
            name: channel_name.to_string(),
        };
        dir.channels.insert((guild_id, channel_id), channel.clone());
        channel
    }

    /// Store a message so it can be fetched by id.
    pub async fn add_message(
        &self,
        channel: &GuildChannel,
        id: MessageId,
        author: Author,
        content: &str,
    ) {
        let mut dir = self.directory.write().await;
        dir.messages.insert(
            (channel.id, id),
            FetchedMessage {
                id,
                author,
                content: content.to_string(),
            },
        );
    }

    /// Remember an inbound guild message so links to it resolve later.
    pub async fn observe(&self, msg: &InboundMessage) {
        if let MessageSource::Guild {
            guild_id,
            channel_id,
            channel_name,
        } = &msg.source
        {
            let channel = self
                .add_channel(*guild_id, "local", *channel_id, channel_name)
                .await;
            self.add_message(&channel, msg.id, msg.author.clone(), &msg.content)
                .await;
        }
    }

    /// Everything sent so far, in order.
    pub async fn sent(&self) -> Vec<(ChannelRef, String)> {
        self.sent.read().await.clone()
    }

    /// Texts sent to one target, in order.
    pub async fn sent_to(&self, target: &ChannelRef) -> Vec<String> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub async fn clear_sent(&self) {
        self.sent.write().await.clear();
    }
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatPlatform for MemoryPlatform {
    fn name(&self) -> &str {
        "memory"
    }

    async fn send_message(&self, target: &ChannelRef, text: &str) -> Result<(), PlatformError> {
        if self.echo {
            println!("[{target}] {text}\n");
        }
        self.sent.write().await.push((target.clone(), text.to_string()));
        Ok(())
    }

    async fn resolve_guild(&self, id: GuildId) -> Result<Option<Guild>, PlatformError> {
        Ok(self.directory.read().await.guilds.get(&id).cloned())
    }

    async fn resolve_channel(
        &self,
        guild: &Guild,
        id: ChannelId,
    ) -> Result<Option<GuildChannel>, PlatformError> {
        Ok(self
            .directory
            .read()
            .await
            .channels
            .get(&(guild.id, id))
            .cloned())
    }

    async fn find_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<GuildChannel>, PlatformError> {
        let dir = self.directory.read().await;
        let mut matches: Vec<&GuildChannel> = dir
            .channels
            .values()
            .filter(|c| c.guild_id == guild_id && c.name == name)
            .collect();
        matches.sort_by_key(|c| c.id);
        Ok(matches.first().map(|c| (*c).clone()))
    }

    async fn fetch_message(
        &self,
        channel: &GuildChannel,
        id: MessageId,
    ) -> Result<Option<FetchedMessage>, PlatformError> {
        Ok(self
            .directory
            .read()
            .await
            .messages
            .get(&(channel.id, id))
            .cloned())
    }
}
