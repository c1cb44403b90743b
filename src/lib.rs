//! seat-watch - A Discord bot that watches college class sections for seat changes.
//!
//! Users subscribe to a (quarter, subject, class id) through prefix commands.
//! A background poller groups subscriptions by listing page, fetches each
//! page once per pass and posts an alert to a channel when a seat count
//! changes. Subscriptions live in a Google Sheet.

pub mod availability;
pub mod bot;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notifier;
pub mod repository;
pub mod service;
pub mod task;
