//! Row-oriented remote storage and the subscription table built on it.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::repository::error::StoreError;

pub mod error;
pub mod sheets;
pub mod subscription_table;
pub mod token;

/// One stored row as a mapping from column header to cell text.
pub type Row = BTreeMap<String, String>;

/// A remote store of header-named rows.
///
/// Rows are 1-indexed and row 1 conventionally holds the column headers.
/// There are no transactions: every write replaces the given cells and the
/// last writer wins.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Index of the last non-empty row.
    async fn get_last_row_index(&self) -> Result<u32, StoreError>;

    /// Rows `start..=end`, in order. Trailing empty rows may be omitted.
    async fn get_rows(&self, start: u32, end: u32) -> Result<Vec<Row>, StoreError>;

    /// Writes the given cells of row `index`, leaving other cells untouched.
    async fn set_row(&self, index: u32, fields: Row) -> Result<(), StoreError>;
}
