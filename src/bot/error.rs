#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BotError {
    #[error("Invalid argument for {parameter}: {reason}")]
    InvalidCommandArgument { parameter: String, reason: String },

    #[error("Oops, you need {expected} parameters ({usage}), but got {found}.")]
    WrongArgumentCount {
        expected: usize,
        found: usize,
        usage: &'static str,
    },

    #[error("This command can only be used in a server.")]
    GuildOnlyCommand,

    #[error("{0}")]
    PermissionDenied(String),
}
