//! Application entry point for seat-watch.
//!
//! Initializes all components, starts the Discord bot and the seat poller.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use log::debug;
use log::info;
use seat_watch::availability::class_page::ClassPageFetcher;
use seat_watch::bot::Bot;
use seat_watch::config::Config;
use seat_watch::logging::setup_logging;
use seat_watch::notifier::discord_channel_notifier::DiscordChannelNotifier;
use seat_watch::repository::RowStore;
use seat_watch::repository::sheets::SheetsRowStore;
use seat_watch::repository::subscription_table::SubscriptionTable;
use seat_watch::repository::token::ServiceAccountTokens;
use seat_watch::service::Services;
use seat_watch::task::seat_poller::SeatPoller;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = load_config()?;
    let services = setup_services(&config)?;

    setup_bot(&config, services.clone(), init_start).await?;
    let poller = setup_poller(&config, &services, init_start)?;

    run(poller, init_start).await
}

fn load_config() -> Result<Arc<Config>> {
    debug!("Loading configuration...");
    let mut config = Config::new();
    config.load()?;
    let config = Arc::new(config);
    setup_logging(&config)?;
    info!("Starting seat-watch...");
    Ok(config)
}

fn setup_services(config: &Config) -> Result<Arc<Services>> {
    debug!("Setting up Services...");
    let tokens = Arc::new(ServiceAccountTokens::from_file(
        &config.sheets_credentials_path,
    )?);
    let store: Arc<dyn RowStore> = Arc::new(SheetsRowStore::new(
        &config.sheets_api_url,
        &config.sheets_spreadsheet_id,
        &config.sheets_sheet_name,
        tokens,
    )?);
    let table = Arc::new(SubscriptionTable::new(store));
    let source = Arc::new(ClassPageFetcher::new(&config.class_page_url)?);

    let http = Bot::create_http(config)?;
    let notifier = Arc::new(DiscordChannelNotifier::new(http, config.alert_channel_id));

    Ok(Arc::new(Services::new(table, source, notifier)))
}

async fn setup_bot(config: &Arc<Config>, services: Arc<Services>, init_start: Instant) -> Result<()> {
    info!("Starting bot...");
    let mut bot = Bot::new(config.clone(), services).await?;
    bot.start();
    info!(
        "Bot setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn setup_poller(config: &Config, services: &Services, init_start: Instant) -> Result<Arc<SeatPoller>> {
    debug!("Setting up SeatPoller...");
    let poller = SeatPoller::new(services.seat_check.clone(), config.poll_interval);
    poller.clone().start()?;
    info!(
        "Poller setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
    Ok(poller)
}

async fn run(poller: Arc<SeatPoller>, init_start: Instant) -> Result<()> {
    info!(
        "seat-watch is up in {:.2}s. Press Ctrl+C to stop.",
        init_start.elapsed().as_secs_f64()
    );

    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down.");
    poller.stop()?;

    Ok(())
}
