use std::str::FromStr;

use poise::serenity_prelude::RoleId;

use crate::bot::commands::Context;
use crate::bot::commands::Error;
use crate::bot::error::BotError;

/// Requires the configured watch role, if one is configured.
pub async fn check_watch_role(ctx: Context<'_>) -> Result<(), Error> {
    let Some(required_role_id) = ctx.data().config.watch_role_id.clone() else {
        return Ok(());
    };
    let member = ctx
        .author_member()
        .await
        .ok_or(BotError::GuildOnlyCommand)?;

    Ok(check_role_inner(&member.roles, &required_role_id)?)
}

fn check_role_inner(user_roles: &[RoleId], required_role_id: &str) -> Result<(), BotError> {
    if let Ok(role_id) = RoleId::from_str(required_role_id)
        && user_roles.contains(&role_id)
    {
        return Ok(());
    }

    Err(BotError::PermissionDenied(format!(
        "You need the <@&{required_role_id}> role to watch classes."
    )))
}
