//! Notifier that posts alerts to a fixed Discord channel.

use std::sync::Arc;

use anyhow::Result;
use log::debug;
use log::info;
use poise::serenity_prelude::ChannelId;
use poise::serenity_prelude::CreateMessage;
use poise::serenity_prelude::GenericChannelId;
use poise::serenity_prelude::Http;

use crate::notifier::Notifier;

/// Sends every alert to one channel, tagging subscribers in the content.
pub struct DiscordChannelNotifier {
    http: Arc<Http>,
    channel_id: GenericChannelId,
}

impl DiscordChannelNotifier {
    pub fn new(http: Arc<Http>, channel_id: u64) -> Self {
        debug!("Initializing DiscordChannelNotifier for channel id `{channel_id}`.");
        Self {
            http,
            channel_id: GenericChannelId::from(ChannelId::new(channel_id)),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DiscordChannelNotifier {
    async fn notify(&self, content: &str) -> Result<()> {
        let message = CreateMessage::new().content(content.to_string());
        self.channel_id.send_message(&self.http, message).await?;
        info!("Sent alert to channel id `{}`.", self.channel_id);
        Ok(())
    }
}
