use poise::Command;

use crate::bot::Data;

pub mod owner;
pub mod watch;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub use owner::OwnerCog;
pub use watch::WatchCog;

pub trait Cog {
    fn commands(&self) -> Vec<Command<Data, Error>>;
}

pub struct Cogs;

impl Cog for Cogs {
    fn commands(&self) -> Vec<Command<Data, Error>> {
        let watch_cog = WatchCog;
        let owner_cog = OwnerCog;

        watch_cog
            .commands()
            .into_iter()
            .chain(owner_cog.commands())
            .collect()
    }
}
