//! Inbound message sources.

pub mod channel;
pub mod cli;
pub mod discord;

pub use channel::*;
pub use cli::{CliChannel, CliParser};
pub use discord::DiscordChannel;
