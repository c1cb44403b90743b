//! Business logic for class watching and seat checks.

use std::sync::Arc;

use crate::availability::AvailabilitySource;
use crate::notifier::Notifier;
use crate::repository::subscription_table::SubscriptionTable;
use crate::service::seat_check_service::SeatCheckService;
use crate::service::watch_service::WatchService;

pub mod error;
pub mod seat_check_service;
pub mod watch_service;

/// Container for all application services.
pub struct Services {
    pub watch: Arc<WatchService>,
    pub seat_check: Arc<SeatCheckService>,
}

impl Services {
    /// Creates all services over one subscription table.
    pub fn new(
        table: Arc<SubscriptionTable>,
        source: Arc<dyn AvailabilitySource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            watch: Arc::new(WatchService::new(table.clone(), source.clone())),
            seat_check: Arc::new(SeatCheckService::new(table, source, notifier)),
        }
    }
}
