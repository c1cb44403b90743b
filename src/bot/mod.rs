//! Discord bot implementation and command handling.

pub mod checks;
pub mod commands;
pub mod error;
pub mod error_handler;
pub mod utils;

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::error;
use log::info;
use log::warn;
use poise::Framework;
use poise::FrameworkOptions;
use poise::serenity_prelude::ClientBuilder;
use poise::serenity_prelude::GatewayIntents;
use poise::serenity_prelude::Http;
use poise::serenity_prelude::Token;
use poise::serenity_prelude::UserId;

use crate::bot::commands::Cog;
use crate::bot::commands::Cogs;
use crate::bot::commands::Error;
use crate::bot::error_handler::ErrorHandler;
use crate::config::Config;
use crate::service::Services;

/// Data shared across bot commands and contexts.
pub struct Data {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
}

/// Discord bot client and framework.
pub struct Bot {
    client_builder: Option<ClientBuilder>,
}

impl Bot {
    /// Creates the REST client used both by the bot and by notifiers.
    pub fn create_http(config: &Config) -> Result<Arc<Http>> {
        let token = Token::from_str(&config.discord_token)?;
        Ok(Arc::new(Http::new(token)))
    }

    /// Creates a new bot instance with all required components.
    pub async fn new(config: Arc<Config>, services: Arc<Services>) -> Result<Self> {
        info!("Initializing bot...");

        let framework = Self::create_framework(&config)?;
        let data = Arc::new(Data {
            config: config.clone(),
            services,
        });
        let (token, intents) = Self::create_client_config(&config)?;

        let client_builder = ClientBuilder::new(token, intents)
            .framework(framework)
            .data(data);

        Ok(Self {
            client_builder: Some(client_builder),
        })
    }

    /// Starts the bot client in a background task.
    pub fn start(&mut self) {
        let Some(client_builder) = self.client_builder.take() else {
            warn!("Bot client already started.");
            return;
        };
        info!("Starting bot client...");

        tokio::spawn(async move {
            info!("Connecting bot to Discord...");
            let mut client = match client_builder.await {
                Ok(client) => client,
                Err(e) => {
                    error!("Failed to build Discord client: {e}");
                    return;
                }
            };
            info!("Bot connected to Discord.");

            if let Err(e) = client.start().await {
                error!("Bot client stopped: {e}");
            }
        });

        info!("Bot client start initiated.");
    }

    /// Creates the Poise framework with commands and configuration.
    fn create_framework(config: &Config) -> Result<Box<Framework<Data, Error>>> {
        let cogs = Cogs;
        let options = FrameworkOptions::<Data, Error> {
            commands: cogs.commands(),
            on_error: |error| Box::pin(Self::on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone().into()),
                case_insensitive_commands: true,
                edit_tracker: Some(Arc::new(poise::EditTracker::for_timespan(
                    Duration::from_secs(3600),
                ))),
                ..Default::default()
            },
            owners: HashSet::from([UserId::from_str(&config.admin_id)
                .map_err(|_| anyhow::anyhow!("Invalid admin ID"))?]),
            ..Default::default()
        };

        Ok(Box::new(
            poise::Framework::builder().options(options).build(),
        ))
    }

    /// Creates Discord client configuration (token and intents).
    fn create_client_config(config: &Config) -> Result<(Token, GatewayIntents)> {
        let token = Token::from_str(&config.discord_token)?;
        let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;
        Ok((token, intents))
    }

    /// Handles framework errors by delegating to the error handler.
    async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
        ErrorHandler::handle(error).await;
    }
}
