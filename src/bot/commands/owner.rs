//! Owner-only commands for bot administration.

use poise::Command;
use poise::CreateReply;
use poise::serenity_prelude::CreateAttachment;

use crate::bot::Data;
use crate::bot::commands::Cog;
use crate::bot::commands::Context;
use crate::bot::commands::Error;
use crate::service::seat_check_service::PassOutcome;

/// Cog of bot owners-only commands.
pub struct OwnerCog;

impl OwnerCog {
    /// Run a seat check now (owner only)
    ///
    /// Shares the in-flight guard with the background poller, so it never
    /// overlaps a scheduled pass.
    #[poise::command(prefix_command, owners_only, hide_in_help)]
    pub async fn poll(ctx: Context<'_>) -> Result<(), Error> {
        let data = ctx.data();
        let reply = match data.services.seat_check.run_pass().await? {
            PassOutcome::Completed(summary) => format!(
                "Seat check done: {} groups, {} classes, {} changed, {} alerts sent, {} not found, {} failed.",
                summary.groups,
                summary.classes,
                summary.changed,
                summary.notified,
                summary.not_found,
                summary.failures
            ),
            PassOutcome::AlreadyRunning => "A seat check is already running.".to_string(),
        };
        ctx.reply(reply).await?;
        Ok(())
    }

    /// Export the watch list (owner only)
    #[poise::command(prefix_command, owners_only, hide_in_help)]
    pub async fn dump(ctx: Context<'_>) -> Result<(), Error> {
        let data = ctx.data();
        let subscriptions = data.services.watch.table.list_all().await?;

        let reply = CreateReply::default()
            .content(format!("{} subscriptions:", subscriptions.len()))
            .attachment(CreateAttachment::bytes(
                serde_json::to_string_pretty(&subscriptions)?.into_bytes(),
                "subscriptions.json",
            ));

        ctx.send(reply).await?;
        Ok(())
    }
}

impl Cog for OwnerCog {
    fn commands(&self) -> Vec<Command<Data, Error>> {
        vec![Self::poll(), Self::dump()]
    }
}
