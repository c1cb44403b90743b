//! Error handling for Discord bot commands.

use log::error;
use poise::FrameworkError;

use crate::bot::Data;
use crate::bot::commands::Error;
use crate::bot::error::BotError;
use crate::error::AppError;
use crate::service::error::ServiceError;

/// Handles framework errors and sends appropriate responses to users.
pub struct ErrorHandler;

impl ErrorHandler {
    /// Handles a framework error by classifying and responding appropriately.
    pub async fn handle(error: FrameworkError<'_, Data, Error>) {
        match error {
            FrameworkError::Command { error, ctx, .. } => {
                let message = Self::classify_error(&error, &ctx.command().name);
                Self::reply(&ctx, &message).await;
            }
            FrameworkError::ArgumentParse { error, ctx, .. } => {
                let message = format!(
                    ":warning: {error}\nUse `{}help` for usage information.",
                    ctx.data().config.command_prefix
                );
                Self::reply(&ctx, &message).await;
            }
            error => {
                if let Err(e) = poise::builtins::on_error(error).await {
                    error!("Error while handling error: {}", e);
                }
            }
        }
    }

    /// Turns a command error into the text shown to the user.
    fn classify_error(error: &Error, command: &str) -> String {
        if let Some(bot_error) = error.downcast_ref::<BotError>() {
            format!(":warning: {bot_error}")
        } else if let Some(service_error) = error.downcast_ref::<ServiceError>() {
            error!("Service error in command `{command}`: {service_error}");
            format!(":x: {service_error}. Nothing was changed, please try again later.")
        } else {
            let ref_id = AppError::log_with_ref(error);
            error!("Unexpected error in command `{command}`: {error:?}");
            format!(
                ":x: An unexpected error occurred. Please contact the bot developer.\nReference ID: {ref_id}"
            )
        }
    }

    async fn reply(ctx: &poise::Context<'_, Data, Error>, message: &str) {
        if let Err(e) = ctx.reply(message).await {
            error!("Failed to send error reply: {e}");
        }
    }
}
