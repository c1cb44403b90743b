//! Watch list management behind the `add`, `remove` and `status` commands.

use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;

use crate::availability::AvailabilitySource;
use crate::model::SubscriberIds;
use crate::model::Subscription;
use crate::repository::subscription_table::NewSubscription;
use crate::repository::subscription_table::SubscriptionTable;
use crate::service::error::ServiceError;

/// Service for adding, removing and listing watched classes.
///
/// `add` and `remove` read a row and write it back; they run one at a time
/// so concurrent commands cannot overwrite each other's rows.
pub struct WatchService {
    pub table: Arc<SubscriptionTable>,
    pub source: Arc<dyn AvailabilitySource>,
    edit_lock: Mutex<()>,
}

impl WatchService {
    pub fn new(table: Arc<SubscriptionTable>, source: Arc<dyn AvailabilitySource>) -> Self {
        Self {
            table,
            source,
            edit_lock: Mutex::new(()),
        }
    }

    /// Adds `user_id` as a watcher of a class, creating its row if needed.
    ///
    /// # Performance
    /// * Store reads: 1
    /// * Store writes: 1?
    /// * Page fetches: 1? (new rows only)
    pub async fn add(
        &self,
        user_id: &str,
        quarter: &str,
        subject: &str,
        class_id: &str,
    ) -> Result<AddResult, ServiceError> {
        let _edit = self.edit_lock.lock().await;
        if let Some(mut subscription) = self.table.find_row(quarter, subject, class_id).await? {
            if subscription.subscribers.contains(user_id) {
                return Ok(AddResult::AlreadyWatching { subscription });
            }

            let other_watchers = subscription.subscribers.len();
            subscription.subscribers.insert(user_id);
            self.table
                .update_subscribers(subscription.row, &subscription.subscribers)
                .await?;
            info!(
                "Added user `{user_id}` to {}#{class_id} at {}.",
                subject.to_uppercase(),
                subscription.row
            );
            return Ok(AddResult::Joined {
                subscription,
                other_watchers,
            });
        }

        let seats = self
            .source
            .fetch_seats(quarter, subject, &[class_id.to_string()])
            .await
            .first()
            .and_then(|a| a.seats());

        let subscription = self
            .table
            .append_row(NewSubscription {
                quarter: quarter.to_string(),
                subject: subject.to_string(),
                class_id: class_id.to_string(),
                subscribers: SubscriberIds::from_iter([user_id]),
                last_known_seats: seats,
            })
            .await?;
        info!(
            "Created {}#{class_id} at {} for user `{user_id}`.",
            subject.to_uppercase(),
            subscription.row
        );
        Ok(AddResult::Created { subscription })
    }

    /// Removes `user_id` from the first row for this quarter and class id.
    ///
    /// # Performance
    /// * Store reads: 1
    /// * Store writes: 1?
    pub async fn remove(
        &self,
        user_id: &str,
        quarter: &str,
        class_id: &str,
    ) -> Result<RemoveResult, ServiceError> {
        let _edit = self.edit_lock.lock().await;
        let Some(mut subscription) = self.table.find_by_quarter_and_class(quarter, class_id).await?
        else {
            return Ok(RemoveResult::NotWatching);
        };
        if !subscription.subscribers.remove(user_id) {
            return Ok(RemoveResult::NotWatching);
        }

        self.table
            .update_subscribers(subscription.row, &subscription.subscribers)
            .await?;
        info!("Removed user `{user_id}` from #{class_id} at {}.", subscription.row);
        Ok(RemoveResult::Removed { subscription })
    }

    /// Every row `user_id` watches, in store order.
    ///
    /// # Performance
    /// * Store reads: 1
    pub async fn status(&self, user_id: &str) -> Result<Vec<Subscription>, ServiceError> {
        Ok(self
            .table
            .list_all()
            .await?
            .into_iter()
            .filter(|s| s.subscribers.contains(user_id))
            .collect())
    }
}

// Return types
#[derive(Debug)]
pub enum AddResult {
    /// A new row was created with the caller as its only watcher
    Created { subscription: Subscription },
    /// The caller joined an existing row
    Joined {
        subscription: Subscription,
        other_watchers: usize,
    },
    /// The caller already watches this class
    AlreadyWatching { subscription: Subscription },
}

#[derive(Debug)]
pub enum RemoveResult {
    Removed { subscription: Subscription },
    NotWatching,
}
