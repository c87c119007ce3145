//! Discord REST adapter.
//!
//! Implements `ChatPlatform` over the Discord HTTP API (v10). Only the REST
//! side is covered; receiving messages is the job of an inbound channel.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{
    Author, ChannelId, ChannelRef, ChatPlatform, FetchedMessage, Guild, GuildChannel, GuildId,
    MessageId, UserId, split_message,
};
use crate::error::PlatformError;

/// Discord's hard limit for message content.
const DISCORD_MAX_MESSAGE_LENGTH: usize = 2000;

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const PLATFORM: &str = "discord";

/// Discord REST client.
pub struct DiscordPlatform {
    bot_token: SecretString,
    api_base: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct GuildPayload {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ChannelPayload {
    id: String,
    #[serde(rename = "type", default)]
    kind: u8,
    #[serde(default)]
    guild_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    position: i64,
}

/// `GUILD_TEXT` in Discord's channel type enum.
const GUILD_TEXT: u8 = 0;

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    username: String,
}

#[derive(Deserialize)]
struct MessagePayload {
    id: String,
    author: UserPayload,
    content: String,
}

impl DiscordPlatform {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token.expose_secret())
    }

    /// GET a resource; 404 maps to `None`.
    async fn get_optional<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
    ) -> Result<Option<T>, PlatformError> {
        let resp = self
            .client
            .get(self.api_url(path))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| PlatformError::RequestFailed {
                platform: PLATFORM.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PlatformError::AuthFailed {
                platform: PLATFORM.into(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Http {
                platform: PLATFORM.into(),
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>()
            .await
            .map(Some)
            .map_err(|e| PlatformError::InvalidResponse {
                platform: PLATFORM.into(),
                reason: e.to_string(),
            })
    }

    /// Open (or reuse) the DM channel with a user.
    async fn dm_channel(&self, user_id: UserId) -> Result<ChannelId, PlatformError> {
        let resp = self
            .client
            .post(self.api_url("/users/@me/channels"))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&serde_json::json!({ "recipient_id": user_id.to_string() }))
            .send()
            .await
            .map_err(|e| PlatformError::RequestFailed {
                platform: PLATFORM.into(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PlatformError::Http {
                platform: PLATFORM.into(),
                status,
                body,
            });
        }

        let channel: ChannelPayload =
            resp.json()
                .await
                .map_err(|e| PlatformError::InvalidResponse {
                    platform: PLATFORM.into(),
                    reason: e.to_string(),
                })?;
        parse_id(&channel.id)
    }

    async fn post_chunk(&self, channel_id: ChannelId, text: &str) -> Result<(), PlatformError> {
        let resp = self
            .client
            .post(self.api_url(&format!("/channels/{channel_id}/messages")))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&serde_json::json!({ "content": text }))
            .send()
            .await
            .map_err(|e| PlatformError::SendFailed {
                target: channel_id.to_string(),
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(channel_id, status = ?status, "Discord sendMessage failed");
            return Err(PlatformError::SendFailed {
                target: channel_id.to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }
        Ok(())
    }
}

/// Pick the named text channel; ties go to the one listed highest in the guild.
fn find_text_channel(
    guild_id: GuildId,
    channels: Vec<ChannelPayload>,
    name: &str,
) -> Result<Option<GuildChannel>, PlatformError> {
    let Some(payload) = channels
        .into_iter()
        .filter(|c| c.kind == GUILD_TEXT && c.name.as_deref() == Some(name))
        .min_by_key(|c| c.position)
    else {
        return Ok(None);
    };
    Ok(Some(GuildChannel {
        guild_id,
        id: parse_id(&payload.id)?,
        name: name.to_string(),
    }))
}

fn parse_id(raw: &str) -> Result<u64, PlatformError> {
    raw.parse().map_err(|_| PlatformError::InvalidResponse {
        platform: PLATFORM.into(),
        reason: format!("invalid snowflake: {raw}"),
    })
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    fn name(&self) -> &str {
        PLATFORM
    }

    async fn send_message(&self, target: &ChannelRef, text: &str) -> Result<(), PlatformError> {
        let channel_id = match target {
            ChannelRef::Guild { channel_id, .. } => *channel_id,
            ChannelRef::Direct { user_id } => self.dm_channel(*user_id).await?,
        };

        for chunk in split_message(text, DISCORD_MAX_MESSAGE_LENGTH) {
            self.post_chunk(channel_id, &chunk).await?;
        }
        Ok(())
    }

    async fn resolve_guild(&self, id: GuildId) -> Result<Option<Guild>, PlatformError> {
        let Some(payload) = self
            .get_optional::<GuildPayload>(&format!("/guilds/{id}"))
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(Guild {
            id: parse_id(&payload.id)?,
            name: payload.name,
        }))
    }

    async fn resolve_channel(
        &self,
        guild: &Guild,
        id: ChannelId,
    ) -> Result<Option<GuildChannel>, PlatformError> {
        let Some(payload) = self
            .get_optional::<ChannelPayload>(&format!("/channels/{id}"))
            .await?
        else {
            return Ok(None);
        };
        // A channel from another guild is treated as missing.
        if payload.guild_id.as_deref() != Some(guild.id.to_string().as_str()) {
            return Ok(None);
        }
        Ok(Some(GuildChannel {
            guild_id: guild.id,
            id: parse_id(&payload.id)?,
            name: payload.name.unwrap_or_default(),
        }))
    }

    async fn find_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<GuildChannel>, PlatformError> {
        let Some(channels) = self
            .get_optional::<Vec<ChannelPayload>>(&format!("/guilds/{guild_id}/channels"))
            .await?
        else {
            return Ok(None);
        };
        find_text_channel(guild_id, channels, name)
    }

    async fn fetch_message(
        &self,
        channel: &GuildChannel,
        id: MessageId,
    ) -> Result<Option<FetchedMessage>, PlatformError> {
        let Some(payload) = self
            .get_optional::<MessagePayload>(&format!("/channels/{}/messages/{id}", channel.id))
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(FetchedMessage {
            id: parse_id(&payload.id)?,
            author: Author {
                id: parse_id(&payload.author.id)?,
                name: payload.author.username,
            },
            content: payload.content,
        }))
    }
}
