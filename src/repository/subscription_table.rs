//! Subscription rows stored in a [`RowStore`].

use std::sync::Arc;

use log::debug;
use log::warn;

use crate::model::RowRef;
use crate::model::SeatCount;
use crate::model::SubscriberIds;
use crate::model::Subscription;
use crate::repository::Row;
use crate::repository::RowStore;
use crate::repository::error::StoreError;

pub const QUARTER_COLUMN: &str = "Quarter Name";
pub const SUBJECT_COLUMN: &str = "Class Name";
pub const CLASS_ID_COLUMN: &str = "Class Number";
pub const SUBSCRIBERS_COLUMN: &str = "User IDs";
pub const SEATS_COLUMN: &str = "Previous Seats";

/// First row holding data; row 1 is the header.
const FIRST_DATA_ROW: u32 = 2;

/// A subscription that has not been written yet.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub quarter: String,
    pub subject: String,
    pub class_id: String,
    pub subscribers: SubscriberIds,
    pub last_known_seats: Option<SeatCount>,
}

/// Store adapter for subscription rows.
///
/// Lookups are linear scans over a fresh read of the store. Nothing is
/// cached, so a read followed by a write is not atomic.
pub struct SubscriptionTable {
    store: Arc<dyn RowStore>,
}

impl SubscriptionTable {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// All subscription rows in store order, skipping header and blank rows.
    pub async fn list_all(&self) -> Result<Vec<Subscription>, StoreError> {
        let last = self.store.get_last_row_index().await?;
        if last < FIRST_DATA_ROW {
            return Ok(Vec::new());
        }

        let rows = self.store.get_rows(FIRST_DATA_ROW, last).await?;
        let subscriptions = rows
            .iter()
            .zip(FIRST_DATA_ROW..)
            .filter_map(|(row, index)| Self::parse_row(row, RowRef::new(index)))
            .collect::<Vec<_>>();

        debug!("Read {} subscription rows.", subscriptions.len());
        Ok(subscriptions)
    }

    /// Row tracking exactly this (quarter, subject, class id), if any.
    pub async fn find_row(
        &self,
        quarter: &str,
        subject: &str,
        class_id: &str,
    ) -> Result<Option<Subscription>, StoreError> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|s| s.matches(quarter, subject, class_id)))
    }

    /// First row for this quarter and class id, whatever its subject.
    pub async fn find_by_quarter_and_class(
        &self,
        quarter: &str,
        class_id: &str,
    ) -> Result<Option<Subscription>, StoreError> {
        Ok(self.list_all().await?.into_iter().find(|s| {
            s.quarter.eq_ignore_ascii_case(quarter) && s.class_id == class_id
        }))
    }

    /// Writes a new row after the last one.
    pub async fn append_row(&self, new: NewSubscription) -> Result<Subscription, StoreError> {
        let index = self.store.get_last_row_index().await?.max(1) + 1;

        let fields = Row::from([
            (QUARTER_COLUMN.to_string(), new.quarter.clone()),
            (SUBJECT_COLUMN.to_string(), new.subject.clone()),
            (CLASS_ID_COLUMN.to_string(), new.class_id.clone()),
            (SUBSCRIBERS_COLUMN.to_string(), new.subscribers.to_string()),
            (
                SEATS_COLUMN.to_string(),
                new.last_known_seats
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
            ),
        ]);
        self.write(index, fields).await?;

        Ok(Subscription {
            row: RowRef::new(index),
            quarter: new.quarter,
            subject: new.subject,
            class_id: new.class_id,
            subscribers: new.subscribers,
            last_known_seats: new.last_known_seats,
        })
    }

    pub async fn update_subscribers(
        &self,
        row: RowRef,
        subscribers: &SubscriberIds,
    ) -> Result<(), StoreError> {
        let fields = Row::from([(SUBSCRIBERS_COLUMN.to_string(), subscribers.to_string())]);
        self.write(row.index(), fields).await
    }

    pub async fn update_seats(&self, row: RowRef, seats: SeatCount) -> Result<(), StoreError> {
        let fields = Row::from([(SEATS_COLUMN.to_string(), seats.to_string())]);
        self.write(row.index(), fields).await
    }

    async fn write(&self, index: u32, fields: Row) -> Result<(), StoreError> {
        self.store
            .set_row(index, fields)
            .await
            .map_err(|e| match e {
                StoreError::WriteFailed { .. } => e,
                e => StoreError::WriteFailed {
                    row: index,
                    message: e.to_string(),
                },
            })
    }

    fn parse_row(row: &Row, row_ref: RowRef) -> Option<Subscription> {
        // A header copy somewhere below row 1 maps each column onto itself.
        if row.iter().any(|(column, value)| column == value) {
            return None;
        }

        let field = |column: &str| row.get(column).map(|v| v.trim()).unwrap_or_default();
        let (quarter, subject, class_id) = (
            field(QUARTER_COLUMN),
            field(SUBJECT_COLUMN),
            field(CLASS_ID_COLUMN),
        );
        if quarter.is_empty() && subject.is_empty() && class_id.is_empty() {
            return None;
        }
        if quarter.is_empty() || subject.is_empty() || class_id.is_empty() {
            warn!("Skipping incomplete subscription at {row_ref}: {row:?}");
            return None;
        }

        let seats = field(SEATS_COLUMN);
        let last_known_seats = if seats.is_empty() {
            None
        } else {
            match seats.parse::<SeatCount>() {
                Ok(seats) => Some(seats),
                Err(_) => {
                    warn!("Ignoring invalid seat count `{seats}` at {row_ref}");
                    None
                }
            }
        };

        Some(Subscription {
            row: row_ref,
            quarter: quarter.to_string(),
            subject: subject.to_string(),
            class_id: class_id.to_string(),
            subscribers: SubscriberIds::parse(field(SUBSCRIBERS_COLUMN)),
            last_known_seats,
        })
    }
}
