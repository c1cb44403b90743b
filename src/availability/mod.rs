//! Section availability: fetching class pages and reading seat counts.

use async_trait::async_trait;

use crate::model::ClassAvailability;

pub mod class_page;
pub mod error;
pub mod html;
pub mod seat_parser;

/// Source of seat counts for the class ids of one (quarter, subject) page.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Resolves every id in `class_ids` with a single page lookup.
    ///
    /// The result has one entry per requested id, in the same order. Any
    /// failure resolves to [`ClassAvailability::NotFound`] instead of an error.
    async fn fetch_seats(
        &self,
        quarter: &str,
        subject: &str,
        class_ids: &[String],
    ) -> Vec<ClassAvailability>;
}
