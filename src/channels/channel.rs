//! Inbound channel trait.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;
use crate::platform::InboundMessage;

/// Stream of inbound messages from a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = InboundMessage> + Send>>;

/// A source of inbound chat messages. Replies do not go back through the
/// channel; the router sends them through the `ChatPlatform`.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start receiving. The stream ends when the source is exhausted.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
