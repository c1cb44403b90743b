//! Periodic seat check: groups subscriptions, fetches each class page once,
//! alerts subscribers of changed classes and records the new counts.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use chrono::DateTime;
use chrono::Utc;
use log::debug;
use log::error;
use log::info;
use log::warn;

use crate::availability::AvailabilitySource;
use crate::model::ClassAvailability;
use crate::model::GroupKey;
use crate::model::SeatCount;
use crate::model::Subscription;
use crate::notifier::Notifier;
use crate::notifier::message::seat_change_messages;
use crate::repository::subscription_table::SubscriptionTable;
use crate::service::error::ServiceError;

/// Service that runs seat check passes.
pub struct SeatCheckService {
    pub table: Arc<SubscriptionTable>,
    pub source: Arc<dyn AvailabilitySource>,
    pub notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

impl SeatCheckService {
    pub fn new(
        table: Arc<SubscriptionTable>,
        source: Arc<dyn AvailabilitySource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            table,
            source,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Runs one pass over every subscription.
    ///
    /// Only one pass runs at a time; a call made while another pass is in
    /// flight returns [`PassOutcome::AlreadyRunning`] without touching the
    /// store. Failures inside a group are logged and counted, never returned.
    ///
    /// # Performance
    /// * Store reads: 1
    /// * Page fetches: 1 per (quarter, subject) group
    pub async fn run_pass(&self) -> Result<PassOutcome, ServiceError> {
        let Some(_guard) = PassGuard::acquire(&self.in_flight) else {
            return Ok(PassOutcome::AlreadyRunning);
        };

        let started = Utc::now();
        let groups = group_subscriptions(self.table.list_all().await?);
        let mut summary = PassSummary::new(started);
        summary.groups = groups.len();
        info!("Checking {} class groups.", groups.len());

        for (key, entries) in &groups {
            self.check_group(key, entries, &mut summary).await;
        }

        debug!("Finished seat check pass: {summary:?}");
        Ok(PassOutcome::Completed(summary))
    }

    async fn check_group(&self, key: &GroupKey, entries: &[Subscription], summary: &mut PassSummary) {
        let Some(first) = entries.first() else {
            return;
        };
        let class_ids: Vec<String> = entries.iter().map(|e| e.class_id.clone()).collect();
        let results = self
            .source
            .fetch_seats(&first.quarter, &first.subject, &class_ids)
            .await;

        for (entry, result) in entries.iter().zip(results) {
            summary.classes += 1;
            let ClassAvailability::Seats(seats) = result else {
                warn!("No seat data for {key}#{}; keeping stored value.", entry.class_id);
                summary.not_found += 1;
                continue;
            };
            if entry.last_known_seats == Some(seats) {
                continue;
            }

            info!(
                "Seats changed for {key}#{} at {}: {:?} -> {seats}",
                entry.class_id, entry.row, entry.last_known_seats
            );
            summary.changed += 1;
            match self.apply_change(entry, seats).await {
                Ok(true) => summary.notified += 1,
                Ok(false) => {}
                Err(e) => {
                    error!("Error applying change for {key}#{}: {e}", entry.class_id);
                    summary.failures += 1;
                }
            }
        }
    }

    /// Alerts the subscribers of `entry` and stores `seats`.
    ///
    /// Returns whether an alert was sent. A failed alert leaves the stored
    /// count untouched so the change is reported again on the next pass.
    /// A failed write after a sent alert does the same, so the alert repeats.
    async fn apply_change(&self, entry: &Subscription, seats: SeatCount) -> Result<bool, ServiceError> {
        let messages = seat_change_messages(
            &entry.subject,
            &entry.class_id,
            &entry.subscribers,
            seats,
            entry.last_known_seats,
        );
        if messages.is_empty() {
            debug!("Nobody watches {}#{}; only storing seats.", entry.subject, entry.class_id);
        }
        for message in &messages {
            self.notifier
                .notify(message)
                .await
                .map_err(|e| ServiceError::NotifyFailed {
                    message: e.to_string(),
                })?;
        }
        let notified = !messages.is_empty();

        if let Err(e) = self.table.update_seats(entry.row, seats).await {
            if notified {
                warn!(
                    "Alert for {}#{} was sent but the new count was not stored; it repeats until a write succeeds.",
                    entry.subject.to_uppercase(),
                    entry.class_id
                );
            }
            return Err(e.into());
        }
        Ok(notified)
    }
}

/// Groups subscriptions by (quarter, subject) so each page is fetched once.
///
/// Entries keep their store order within a group.
pub fn group_subscriptions(
    subscriptions: Vec<Subscription>,
) -> BTreeMap<GroupKey, Vec<Subscription>> {
    let mut groups: BTreeMap<GroupKey, Vec<Subscription>> = BTreeMap::new();
    for subscription in subscriptions {
        groups
            .entry(subscription.group_key())
            .or_default()
            .push(subscription);
    }
    groups
}

pub enum PassOutcome {
    Completed(PassSummary),
    /// Another pass was still in flight.
    AlreadyRunning,
}

/// Counters of one seat check pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub started: DateTime<Utc>,
    pub groups: usize,
    pub classes: usize,
    pub changed: usize,
    pub notified: usize,
    pub not_found: usize,
    pub failures: usize,
}

impl PassSummary {
    fn new(started: DateTime<Utc>) -> Self {
        Self {
            started,
            groups: 0,
            classes: 0,
            changed: 0,
            notified: 0,
            not_found: 0,
            failures: 0,
        }
    }
}

/// Holds the in-flight flag for the duration of a pass.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowRef;
    use crate::model::SubscriberIds;

    fn subscription(index: u32, quarter: &str, subject: &str, class_id: &str) -> Subscription {
        Subscription {
            row: RowRef::new(index),
            quarter: quarter.to_string(),
            subject: subject.to_string(),
            class_id: class_id.to_string(),
            subscribers: SubscriberIds::new(),
            last_known_seats: None,
        }
    }

    #[test]
    fn test_group_subscriptions() {
        let groups = group_subscriptions(vec![
            subscription(2, "fall2024", "acct", "201"),
            subscription(3, "fall2024", "math", "101"),
            subscription(4, "FALL2024", "ACCT", "305"),
            subscription(5, "winter2025", "acct", "201"),
        ]);

        assert_eq!(groups.len(), 3);
        let acct = &groups[&GroupKey::new("fall2024", "acct")];
        assert_eq!(
            acct.iter().map(|s| s.class_id.as_str()).collect::<Vec<_>>(),
            vec!["201", "305"]
        );
        assert_eq!(groups[&GroupKey::new("winter2025", "acct")].len(), 1);
    }

    #[test]
    fn test_group_subscriptions_empty() {
        assert!(group_subscriptions(Vec::new()).is_empty());
    }

    #[test]
    fn test_pass_guard_is_exclusive() {
        let flag = AtomicBool::new(false);
        let guard = PassGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(PassGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(PassGuard::acquire(&flag).is_some());
    }
}
