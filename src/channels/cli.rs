//! CLI channel — stdin lines become chat messages, for local runs.
//!
//! Line grammar:
//! - `dm <user> <text>` — a direct message from `<user>` to the bot
//! - `#<channel> <user> <text>` — a message posted in a guild channel
//!
//! Users and channels get stable numeric ids the first time their name is
//! seen; channels can also be registered up front so the platform knows them
//! before anyone posts. Every channel message prints its link so it can be
//! pasted into a report.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::channels::{Channel, MessageStream};
use crate::error::ChannelError;
use crate::platform::{Author, ChannelId, GuildChannel, GuildId, InboundMessage, MessageId, UserId};

/// Guild every console channel belongs to.
pub const CONSOLE_GUILD_ID: GuildId = 1;

const USAGE: &str = "usage: `dm <user> <text>` or `#<channel> <user> <text>`";

/// Turns console lines into `InboundMessage`s.
#[derive(Debug, Clone)]
pub struct CliParser {
    users: HashMap<String, UserId>,
    channels: HashMap<String, ChannelId>,
    next_user_id: UserId,
    next_channel_id: ChannelId,
    next_message_id: MessageId,
}

impl CliParser {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            channels: HashMap::new(),
            next_user_id: 1000,
            next_channel_id: 100,
            next_message_id: 1,
        }
    }

    pub fn parse(&mut self, line: &str) -> Result<InboundMessage, ChannelError> {
        let line = line.trim();
        let (target, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| ChannelError::InvalidMessage(USAGE.to_string()))?;
        let (user, text) = rest
            .trim_start()
            .split_once(char::is_whitespace)
            .ok_or_else(|| ChannelError::InvalidMessage(USAGE.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ChannelError::InvalidMessage(USAGE.to_string()));
        }

        let author = self.author(user);
        let id = self.next_message_id;
        self.next_message_id += 1;

        if target == "dm" {
            return Ok(InboundMessage::direct(id, author, text));
        }
        match target.strip_prefix('#') {
            Some(name) if !name.is_empty() => {
                let channel = self.channel_named(name);
                Ok(InboundMessage::in_channel(id, author, text, &channel))
            }
            _ => Err(ChannelError::InvalidMessage(USAGE.to_string())),
        }
    }

    fn author(&mut self, name: &str) -> Author {
        let next = &mut self.next_user_id;
        let id = *self.users.entry(name.to_string()).or_insert_with(|| {
            *next += 1;
            *next
        });
        Author {
            id,
            name: name.to_string(),
        }
    }

    /// The console channel with this name, assigning an id on first use.
    pub fn channel_named(&mut self, name: &str) -> GuildChannel {
        let next = &mut self.next_channel_id;
        let id = *self.channels.entry(name.to_string()).or_insert_with(|| {
            *next += 1;
            *next
        });
        GuildChannel {
            guild_id: CONSOLE_GUILD_ID,
            id,
            name: name.to_string(),
        }
    }
}

impl Default for CliParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads chat messages from stdin.
pub struct CliChannel {
    parser: CliParser,
}

impl CliChannel {
    pub fn new() -> Self {
        Self::with_parser(CliParser::new())
    }

    /// Use a parser whose channels were already registered.
    pub fn with_parser(parser: CliParser) -> Self {
        Self { parser }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        let mut parser = self.parser.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            eprintln!("{USAGE}");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        let msg = match parser.parse(&line) {
                            Ok(msg) => msg,
                            Err(e) => {
                                eprintln!("{e}");
                                continue;
                            }
                        };
                        if let Some(link) = message_link(&msg) {
                            eprintln!("  link: {link}");
                        }
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

/// `/<guild>/<channel>/<message>` for guild messages.
fn message_link(msg: &InboundMessage) -> Option<String> {
    match &msg.source {
        crate::platform::MessageSource::Guild {
            guild_id,
            channel_id,
            ..
        } => Some(format!("/{guild_id}/{channel_id}/{}", msg.id)),
        crate::platform::MessageSource::Direct => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MessageLink, MessageSource};

    #[test]
    fn parses_direct_message() {
        let mut parser = CliParser::new();
        let msg = parser.parse("dm alice report").unwrap();
        assert_eq!(msg.author.name, "alice");
        assert_eq!(msg.content, "report");
        assert_eq!(msg.source, MessageSource::Direct);
    }

    #[test]
    fn parses_channel_message_with_spaces() {
        let mut parser = CliParser::new();
        let msg = parser.parse("#group-31 bob meet at the  usual place").unwrap();
        assert_eq!(msg.content, "meet at the  usual place");
        match msg.source {
            MessageSource::Guild {
                guild_id,
                ref channel_name,
                ..
            } => {
                assert_eq!(guild_id, CONSOLE_GUILD_ID);
                assert_eq!(channel_name, "group-31");
            }
            MessageSource::Direct => panic!("expected a guild message"),
        }
    }

    #[test]
    fn ids_are_stable_per_name() {
        let mut parser = CliParser::new();
        let a1 = parser.parse("dm alice hi").unwrap();
        let b = parser.parse("dm bob hi").unwrap();
        let a2 = parser.parse("#group-31 alice hi").unwrap();
        let a3 = parser.parse("#group-31 alice again").unwrap();
        assert_eq!(a1.author.id, a2.author.id);
        assert_ne!(a1.author.id, b.author.id);
        assert_eq!(a2.reply_to(), a3.reply_to());
        assert_ne!(a2.id, a3.id);
    }

    #[test]
    fn registered_channel_keeps_its_id() {
        let mut parser = CliParser::new();
        let mods = parser.channel_named("group-31-mod");
        parser.parse("#general bob hi").unwrap();
        let msg = parser.parse("#group-31-mod alice review").unwrap();
        assert_eq!(msg.reply_to(), mods.to_ref());
    }

    #[test]
    fn printed_link_resolves_to_message() {
        let mut parser = CliParser::new();
        let msg = parser.parse("#group-31 bob hello").unwrap();
        let link = message_link(&msg).unwrap();
        let parsed = MessageLink::find_in(&link).unwrap();
        assert_eq!(parsed.message_id, msg.id);
        assert_eq!(parsed.guild_id, CONSOLE_GUILD_ID);
    }

    #[test]
    fn rejects_malformed_lines() {
        let mut parser = CliParser::new();
        for line in ["", "dm", "dm alice", "dm alice   ", "#", "# bob hi", "say alice hi"] {
            assert!(parser.parse(line).is_err(), "{line:?}");
        }
    }
}
