//! Prefix commands for managing a personal class watch list.

use poise::Command;

use crate::bot::Data;
use crate::bot::checks::check_watch_role;
use crate::bot::commands::Cog;
use crate::bot::commands::Context;
use crate::bot::commands::Error;
use crate::bot::utils::parse_add_args;
use crate::bot::utils::parse_remove_args;
use crate::model::SeatCount;
use crate::model::Subscription;
use crate::service::watch_service::AddResult;
use crate::service::watch_service::RemoveResult;

/// Cog of class watch commands.
pub struct WatchCog;

impl WatchCog {
    /// Watch a class for seat changes
    ///
    /// Usage: `add <quarter> <class name> <item #>`, e.g. `add fall2024 acct 2011`.
    /// Quarter is FALL, WINTER, SPRING or SUMMER followed by the year.
    #[poise::command(prefix_command)]
    pub async fn add(ctx: Context<'_>, #[rest] args: Option<String>) -> Result<(), Error> {
        check_watch_role(ctx).await?;
        let args = parse_add_args(args.as_deref().unwrap_or_default())?;
        let user_id = ctx.author().id.to_string();

        let data = ctx.data();
        let result = data
            .services
            .watch
            .add(&user_id, &args.quarter, &args.subject, &args.class_id)
            .await?;

        let class = format!("{}#{}", args.subject.to_uppercase(), args.class_id);
        let reply = match result {
            AddResult::AlreadyWatching { .. } => format!("You are already watching {class}"),
            AddResult::Joined { other_watchers, .. } => format!(
                "Added class {class} to your watchlist. You are watching along with {other_watchers} other watcher(s)."
            ),
            AddResult::Created { .. } => {
                format!("Added class {class} and added you as its sole watcher")
            }
        };
        ctx.reply(reply).await?;
        Ok(())
    }

    /// Stop watching a class
    ///
    /// Usage: `remove <quarter> <item #>`, e.g. `remove fall2024 2011`.
    #[poise::command(prefix_command)]
    pub async fn remove(ctx: Context<'_>, #[rest] args: Option<String>) -> Result<(), Error> {
        check_watch_role(ctx).await?;
        let args = parse_remove_args(args.as_deref().unwrap_or_default())?;
        let user_id = ctx.author().id.to_string();

        let data = ctx.data();
        let result = data
            .services
            .watch
            .remove(&user_id, &args.quarter, &args.class_id)
            .await?;

        let prefix = &data.config.command_prefix;
        let reply = match result {
            RemoveResult::Removed { .. } => {
                format!("Removed class #{} from your watchlist.", args.class_id)
            }
            RemoveResult::NotWatching => format!(
                "You were not currently watching class #{}. Check your current watchlist with \"{prefix}status.\"",
                args.class_id
            ),
        };
        ctx.reply(reply).await?;
        Ok(())
    }

    /// List the classes you are watching
    #[poise::command(prefix_command)]
    pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
        check_watch_role(ctx).await?;
        let user_id = ctx.author().id.to_string();
        let data = ctx.data();
        let watched = data.services.watch.status(&user_id).await?;

        let prefix = &data.config.command_prefix;
        ctx.reply(render_status(&watched, prefix)).await?;
        Ok(())
    }

    /// Show command usage
    #[poise::command(prefix_command)]
    pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
        let data = ctx.data();
        ctx.reply(help_text(&data.config.command_prefix)).await?;
        Ok(())
    }
}

impl Cog for WatchCog {
    fn commands(&self) -> Vec<Command<Data, Error>> {
        vec![Self::add(), Self::remove(), Self::status(), Self::help()]
    }
}

fn render_seats(seats: Option<SeatCount>) -> String {
    match seats {
        None => "?".to_string(),
        Some(seats) if seats.is_full() => "full".to_string(),
        Some(seats) => match seats.waitlisted() {
            Some(n) => format!("{n} waitlisted"),
            None => seats.to_string(),
        },
    }
}

/// Watch list as a fixed-width table inside a code block.
pub fn render_status(watched: &[Subscription], prefix: &str) -> String {
    if watched.is_empty() {
        return format!(
            "You are not watching any classes. Add one with `{prefix}add <quarter> <class name> <item #>`."
        );
    }

    let mut table = format!(
        "{:<12}{:<8}{:<8}{}\n",
        "Quarter", "Class", "Item #", "# Seats"
    );
    for subscription in watched {
        table.push_str(&format!(
            "{:<12}{:<8}{:<8}{}\n",
            subscription.quarter.to_uppercase(),
            subscription.subject.to_uppercase(),
            subscription.class_id,
            render_seats(subscription.last_known_seats)
        ));
    }
    format!("Your currently watched classes:\n```\n{table}```")
}

pub fn help_text(prefix: &str) -> String {
    format!(
        "**Commands**\n\
         `{prefix}add <quarter> <class name> <item #>` watch a class\n\
         `{prefix}remove <quarter> <item #>` stop watching a class\n\
         `{prefix}status` list your watched classes\n\n\
         **Formats**\n\
         Quarter: FALL, WINTER, SPRING or SUMMER followed by the year (e.g. FALL2024)\n\
         Class name: the 3-5 letter class code (e.g. ACCT)\n\
         Item #: the 3-4 digit item number (e.g. 2011)\n\n\
         Example: `{prefix}add fall2024 acct 2011`"
    )
}
