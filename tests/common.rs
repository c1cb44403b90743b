//! Common test utilities and mock implementations.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use seat_watch::availability::AvailabilitySource;
use seat_watch::model::ClassAvailability;
use seat_watch::model::SeatCount;
use seat_watch::notifier::Notifier;
use seat_watch::repository::Row;
use seat_watch::repository::RowStore;
use seat_watch::repository::error::StoreError;
use seat_watch::repository::subscription_table::CLASS_ID_COLUMN;
use seat_watch::repository::subscription_table::QUARTER_COLUMN;
use seat_watch::repository::subscription_table::SEATS_COLUMN;
use seat_watch::repository::subscription_table::SUBJECT_COLUMN;
use seat_watch::repository::subscription_table::SUBSCRIBERS_COLUMN;
use seat_watch::repository::subscription_table::SubscriptionTable;
use seat_watch::repository::token::AccessTokenSource;
use tokio::sync::Notify;

pub const COLUMNS: [&str; 5] = [
    QUARTER_COLUMN,
    SUBJECT_COLUMN,
    CLASS_ID_COLUMN,
    SUBSCRIBERS_COLUMN,
    SEATS_COLUMN,
];

// MOCK STORE

/// In-memory row store. Row 1 is the header row.
pub struct MemoryRowStore {
    pub rows: Mutex<Vec<Row>>,
    pub writes: Mutex<Vec<(u32, Row)>>,
    pub fail_writes: AtomicBool,
}

impl MemoryRowStore {
    /// Creates a store holding the header row followed by `rows`, each given
    /// as (quarter, subject, class id, user ids, previous seats).
    pub fn with_rows(rows: &[[&str; 5]]) -> Arc<Self> {
        let header: Row = COLUMNS
            .iter()
            .map(|c| (c.to_string(), c.to_string()))
            .collect();
        let mut all = vec![header];
        all.extend(rows.iter().map(|cells| {
            COLUMNS
                .iter()
                .zip(cells.iter())
                .map(|(c, v)| (c.to_string(), v.to_string()))
                .collect::<Row>()
        }));

        Arc::new(Self {
            rows: Mutex::new(all),
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        })
    }

    /// Cell text of a 1-indexed row.
    pub fn cell(&self, index: u32, column: &str) -> String {
        self.rows.lock().unwrap()[index as usize - 1]
            .get(column)
            .cloned()
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn get_last_row_index(&self) -> Result<u32, StoreError> {
        let last = self.rows.lock().unwrap().len() as u32;
        tokio::task::yield_now().await;
        Ok(last)
    }

    async fn get_rows(&self, start: u32, end: u32) -> Result<Vec<Row>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let end = (end as usize).min(rows.len());
        let start = start.max(1) as usize - 1;
        Ok(rows.get(start..end).map(<[Row]>::to_vec).unwrap_or_default())
    }

    async fn set_row(&self, index: u32, fields: Row) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::ApiError {
                status: 503,
                message: "store unavailable".to_string(),
            });
        }
        if let Some(column) = fields.keys().find(|c| !COLUMNS.contains(&c.as_str())) {
            return Err(StoreError::UnknownColumn {
                column: column.clone(),
            });
        }

        let mut rows = self.rows.lock().unwrap();
        while rows.len() < index as usize {
            rows.push(Row::new());
        }
        rows[index as usize - 1].extend(fields.clone());
        self.writes.lock().unwrap().push((index, fields));
        Ok(())
    }
}

pub fn table_over(store: &Arc<MemoryRowStore>) -> Arc<SubscriptionTable> {
    Arc::new(SubscriptionTable::new(store.clone()))
}

// MOCK SOURCE

/// Availability source answering from a fixed script per (quarter, subject).
///
/// A group without a script behaves like a failed page fetch.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<HashMap<(String, String), HashMap<String, i32>>>,
    pub calls: Mutex<Vec<(String, String, Vec<String>)>>,
    /// When set, every fetch signals `entered` and then waits on `gate`.
    pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gate(entered: Arc<Notify>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some((entered, gate)),
            ..Self::default()
        }
    }

    pub fn page(self, quarter: &str, subject: &str, seats: &[(&str, i32)]) -> Self {
        self.pages.lock().unwrap().insert(
            (quarter.to_string(), subject.to_string()),
            seats.iter().map(|(id, n)| (id.to_string(), *n)).collect(),
        );
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AvailabilitySource for ScriptedSource {
    async fn fetch_seats(
        &self,
        quarter: &str,
        subject: &str,
        class_ids: &[String],
    ) -> Vec<ClassAvailability> {
        self.calls.lock().unwrap().push((
            quarter.to_string(),
            subject.to_string(),
            class_ids.to_vec(),
        ));
        if let Some((entered, gate)) = &self.gate {
            entered.notify_one();
            gate.notified().await;
        }
        tokio::task::yield_now().await;

        let pages = self.pages.lock().unwrap();
        let Some(page) = pages.get(&(quarter.to_string(), subject.to_string())) else {
            return vec![ClassAvailability::NotFound; class_ids.len()];
        };
        class_ids
            .iter()
            .map(|id| match page.get(id) {
                Some(n) => ClassAvailability::Seats(SeatCount(*n)),
                None => ClassAvailability::NotFound,
            })
            .collect()
    }
}

// MOCK NOTIFIER

/// Notifier recording every message it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, content: &str) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("channel unavailable");
        }
        self.messages.lock().unwrap().push(content.to_string());
        Ok(())
    }
}

// MOCK TOKENS

/// Hands out tokens in order, moving to the next one on each invalidation.
pub struct RotatingTokens {
    tokens: Vec<String>,
    current: Mutex<usize>,
}

impl RotatingTokens {
    pub fn new(tokens: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            current: Mutex::new(0),
        })
    }

    pub fn invalidations(&self) -> usize {
        *self.current.lock().unwrap()
    }
}

#[async_trait]
impl AccessTokenSource for RotatingTokens {
    async fn access_token(&self) -> Result<String, StoreError> {
        let current = *self.current.lock().unwrap();
        Ok(self.tokens[current.min(self.tokens.len() - 1)].clone())
    }

    async fn invalidate(&self) {
        *self.current.lock().unwrap() += 1;
    }
}
