//! Discord gateway channel.
//!
//! Connects to the Discord gateway over a WebSocket, identifies with the bot
//! token and turns `MESSAGE_CREATE` dispatches into `InboundMessage`s. Channel
//! names come from the `GUILD_CREATE` snapshots sent after `READY`, so guild
//! messages carry the same ids and names the REST adapter sees. A dropped
//! connection is re-established with a fresh identify.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::channels::{Channel, MessageStream};
use crate::error::ChannelError;
use crate::platform::{Author, ChannelId, GuildChannel, GuildId, InboundMessage, UserId};

pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

const CHANNEL_NAME: &str = "discord";

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT
const INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 12) | (1 << 15);

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
}

type GatewaySocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct GatewayPayload {
    op: u8,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    username: String,
}

#[derive(Deserialize)]
struct ReadyPayload {
    user: UserPayload,
}

#[derive(Deserialize)]
struct ChannelPayload {
    id: String,
    #[serde(default)]
    guild_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct GuildCreatePayload {
    id: String,
    #[serde(default)]
    channels: Vec<ChannelPayload>,
}

#[derive(Deserialize)]
struct MessageCreatePayload {
    id: String,
    channel_id: String,
    #[serde(default)]
    guild_id: Option<String>,
    author: UserPayload,
    #[serde(default)]
    content: String,
}

/// What the gateway has told us so far. Kept across reconnects.
#[derive(Debug, Default)]
struct GatewayState {
    self_id: Option<UserId>,
    sequence: Option<u64>,
    channels: HashMap<ChannelId, GuildChannel>,
}

impl GatewayState {
    /// Apply one dispatch event; returns the message it carried, if any.
    fn handle_dispatch(&mut self, event: &str, data: Value) -> Option<InboundMessage> {
        match event {
            "READY" => {
                let ready: ReadyPayload = decode(event, data)?;
                self.self_id = ready.user.id.parse().ok();
                info!(user = %ready.user.username, "Discord gateway ready");
                None
            }
            "GUILD_CREATE" => {
                let guild: GuildCreatePayload = decode(event, data)?;
                let guild_id: GuildId = guild.id.parse().ok()?;
                for channel in guild.channels {
                    self.learn_channel(guild_id, channel);
                }
                debug!(guild_id, cached = self.channels.len(), "Guild channels cached");
                None
            }
            "CHANNEL_CREATE" | "CHANNEL_UPDATE" => {
                let channel: ChannelPayload = decode(event, data)?;
                let guild_id: GuildId = channel.guild_id.as_deref()?.parse().ok()?;
                self.learn_channel(guild_id, channel);
                None
            }
            "MESSAGE_CREATE" => {
                let message: MessageCreatePayload = decode(event, data)?;
                self.inbound(message)
            }
            _ => None,
        }
    }

    fn learn_channel(&mut self, guild_id: GuildId, channel: ChannelPayload) {
        let (Ok(id), Some(name)) = (channel.id.parse::<ChannelId>(), channel.name) else {
            return;
        };
        self.channels.insert(id, GuildChannel { guild_id, id, name });
    }

    fn inbound(&self, message: MessageCreatePayload) -> Option<InboundMessage> {
        let author = Author {
            id: message.author.id.parse().ok()?,
            name: message.author.username,
        };
        if self.self_id == Some(author.id) {
            return None;
        }
        let id = message.id.parse().ok()?;

        let Some(guild_id) = message.guild_id else {
            return Some(InboundMessage::direct(id, author, message.content));
        };
        let guild_id: GuildId = guild_id.parse().ok()?;
        let channel_id: ChannelId = message.channel_id.parse().ok()?;
        let channel = match self.channels.get(&channel_id) {
            Some(channel) => channel.clone(),
            None => {
                // Unnamed channels never match the monitored or moderator name.
                debug!(channel_id, "Message from an uncached channel");
                GuildChannel {
                    guild_id,
                    id: channel_id,
                    name: String::new(),
                }
            }
        };
        Some(InboundMessage::in_channel(id, author, message.content, &channel))
    }
}

fn decode<T: for<'de> Deserialize<'de>>(event: &str, data: Value) -> Option<T> {
    serde_json::from_value(data)
        .inspect_err(|e| warn!(event, error = %e, "Malformed gateway event"))
        .ok()
}

fn identify_payload(token: &SecretString) -> Value {
    json!({
        "op": opcode::IDENTIFY,
        "d": {
            "token": token.expose_secret(),
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "mod-intake",
                "device": "mod-intake",
            },
        },
    })
}

fn heartbeat_payload(sequence: Option<u64>) -> Value {
    json!({ "op": opcode::HEARTBEAT, "d": sequence })
}

fn disconnected(reason: impl Into<String>) -> ChannelError {
    ChannelError::Disconnected {
        name: CHANNEL_NAME.into(),
        reason: reason.into(),
    }
}

/// Receives guild and direct messages from the Discord gateway.
pub struct DiscordChannel {
    bot_token: SecretString,
    gateway_url: String,
}

impl DiscordChannel {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }

    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        CHANNEL_NAME
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let socket = connect(&self.gateway_url)
            .await
            .map_err(|reason| ChannelError::StartupFailed {
                name: CHANNEL_NAME.into(),
                reason,
            })?;

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.gateway_url.clone();
        let token = self.bot_token.clone();

        tokio::spawn(async move {
            let mut state = GatewayState::default();
            let mut next_socket = Some(socket);

            while !tx.is_closed() {
                let socket = match next_socket.take() {
                    Some(socket) => socket,
                    None => match connect(&url).await {
                        Ok(socket) => socket,
                        Err(reason) => {
                            warn!(%reason, "Discord gateway reconnect failed");
                            tokio::time::sleep(RECONNECT_DELAY).await;
                            continue;
                        }
                    },
                };
                match run_session(socket, &token, &mut state, &tx).await {
                    Ok(()) => break,
                    Err(e) => warn!(error = %e, "Discord gateway session ended"),
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
            info!("Discord gateway channel stopped");
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

async fn connect(url: &str) -> Result<GatewaySocket, String> {
    let (socket, _response) = connect_async(url).await.map_err(|e| e.to_string())?;
    info!(url, "Connected to Discord gateway");
    Ok(socket)
}

/// Drive one gateway connection. `Ok` means the receiver went away.
async fn run_session(
    mut socket: GatewaySocket,
    token: &SecretString,
    state: &mut GatewayState,
    tx: &UnboundedSender<InboundMessage>,
) -> Result<(), ChannelError> {
    let hello = next_payload(&mut socket).await?;
    let interval_ms = hello
        .d
        .get("heartbeat_interval")
        .and_then(Value::as_u64)
        .filter(|_| hello.op == opcode::HELLO)
        .ok_or_else(|| disconnected(format!("expected HELLO, got op {}", hello.op)))?;
    send_payload(&mut socket, identify_payload(token)).await?;

    let mut heartbeat = tokio::time::interval(Duration::from_millis(interval_ms));
    // The first tick completes immediately.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                send_payload(&mut socket, heartbeat_payload(state.sequence)).await?;
            }
            payload = next_payload(&mut socket) => {
                let payload = payload?;
                if payload.s.is_some() {
                    state.sequence = payload.s;
                }
                match payload.op {
                    opcode::DISPATCH => {
                        let event = payload.t.unwrap_or_default();
                        if let Some(msg) = state.handle_dispatch(&event, payload.d) {
                            if tx.send(msg).is_err() {
                                return Ok(());
                            }
                        }
                    }
                    opcode::HEARTBEAT => {
                        send_payload(&mut socket, heartbeat_payload(state.sequence)).await?;
                    }
                    opcode::RECONNECT | opcode::INVALID_SESSION => {
                        return Err(disconnected(format!(
                            "gateway requested a new session (op {})",
                            payload.op
                        )));
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Next JSON payload; control frames are skipped.
async fn next_payload(socket: &mut GatewaySocket) -> Result<GatewayPayload, ChannelError> {
    loop {
        let frame = socket
            .next()
            .await
            .ok_or_else(|| disconnected("connection closed"))?
            .map_err(|e| disconnected(e.to_string()))?;
        match frame {
            Message::Text(text) => match serde_json::from_str(text.as_str()) {
                Ok(payload) => return Ok(payload),
                Err(e) => warn!(error = %e, "Undecodable gateway payload"),
            },
            Message::Close(frame) => {
                return Err(disconnected(format!("closed by gateway: {frame:?}")));
            }
            _ => {}
        }
    }
}

async fn send_payload(socket: &mut GatewaySocket, payload: Value) -> Result<(), ChannelError> {
    socket
        .send(Message::Text(payload.to_string().into()))
        .await
        .map_err(|e| disconnected(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ChannelRef, MessageSource};

    fn ready_state() -> GatewayState {
        let mut state = GatewayState::default();
        state.handle_dispatch(
            "READY",
            json!({ "user": { "id": "900", "username": "mod-intake" } }),
        );
        state.handle_dispatch(
            "GUILD_CREATE",
            json!({
                "id": "500",
                "channels": [
                    { "id": "600", "name": "group-31", "type": 0 },
                    { "id": "601", "name": "group-31-mod", "type": 0 },
                    { "id": "602", "type": 4 }
                ]
            }),
        );
        state
    }

    fn message(channel_id: &str, guild_id: Option<&str>, author_id: &str) -> Value {
        let mut data = json!({
            "id": "700",
            "channel_id": channel_id,
            "author": { "id": author_id, "username": "mallory" },
            "content": "meet at the usual place"
        });
        if let Some(guild_id) = guild_id {
            data["guild_id"] = json!(guild_id);
        }
        data
    }

    #[test]
    fn guild_message_carries_cached_channel_name() {
        let mut state = ready_state();
        let msg = state
            .handle_dispatch("MESSAGE_CREATE", message("600", Some("500"), "42"))
            .unwrap();
        assert_eq!(msg.id, 700);
        assert_eq!(msg.author.id, 42);
        assert_eq!(
            msg.source,
            MessageSource::Guild {
                guild_id: 500,
                channel_id: 600,
                channel_name: "group-31".into(),
            }
        );
    }

    #[test]
    fn message_without_guild_is_direct() {
        let mut state = ready_state();
        let msg = state
            .handle_dispatch("MESSAGE_CREATE", message("800", None, "42"))
            .unwrap();
        assert_eq!(msg.reply_to(), ChannelRef::Direct { user_id: 42 });
    }

    #[test]
    fn own_messages_are_dropped() {
        let mut state = ready_state();
        assert!(
            state
                .handle_dispatch("MESSAGE_CREATE", message("600", Some("500"), "900"))
                .is_none()
        );
    }

    #[test]
    fn channel_update_renames_cached_channel() {
        let mut state = ready_state();
        state.handle_dispatch(
            "CHANNEL_UPDATE",
            json!({ "id": "600", "guild_id": "500", "name": "group-32" }),
        );
        let msg = state
            .handle_dispatch("MESSAGE_CREATE", message("600", Some("500"), "42"))
            .unwrap();
        assert!(matches!(
            msg.source,
            MessageSource::Guild { ref channel_name, .. } if channel_name == "group-32"
        ));
    }

    #[test]
    fn uncached_channel_has_empty_name() {
        let mut state = ready_state();
        let msg = state
            .handle_dispatch("MESSAGE_CREATE", message("650", Some("500"), "42"))
            .unwrap();
        match msg.source {
            MessageSource::Guild {
                channel_id,
                ref channel_name,
                ..
            } => {
                assert_eq!(channel_id, 650);
                assert!(channel_name.is_empty());
            }
            MessageSource::Direct => panic!("expected a guild message"),
        }
    }

    #[test]
    fn malformed_and_unknown_events_are_ignored() {
        let mut state = ready_state();
        assert!(state.handle_dispatch("MESSAGE_CREATE", json!({ "id": 1 })).is_none());
        assert!(state.handle_dispatch("TYPING_START", json!({})).is_none());
        assert!(
            state
                .handle_dispatch("MESSAGE_CREATE", message("600", Some("500"), "not-a-number"))
                .is_none()
        );
    }

    #[test]
    fn identify_carries_token_and_intents() {
        let payload = identify_payload(&SecretString::from("secret"));
        assert_eq!(payload["op"], 2);
        assert_eq!(payload["d"]["token"], "secret");
        assert_eq!(payload["d"]["intents"], INTENTS);
        assert_eq!(heartbeat_payload(Some(7))["d"], 7);
        assert!(heartbeat_payload(None)["d"].is_null());
    }
}
