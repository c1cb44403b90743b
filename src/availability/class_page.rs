//! Availability fetcher backed by the college's class schedule pages.

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::Quota;
use governor::RateLimiter;
use governor::clock::QuantaClock;
use governor::state::InMemoryState;
use governor::state::direct::NotKeyed;
use log::debug;
use log::info;
use log::warn;
use wreq::Client;
use wreq::header::HeaderMap;
use wreq::header::HeaderValue;
use wreq::header::USER_AGENT;

use crate::availability::AvailabilitySource;
use crate::availability::error::AvailabilityError;
use crate::availability::html::find_cell_text;
use crate::availability::seat_parser::parse_seats;
use crate::model::ClassAvailability;

/// Page fetches allowed per second across all groups.
const FETCHES_PER_SECOND: NonZeroU32 = NonZeroU32::new(2).unwrap();

/// Fetches `{base_url}/{quarter}/{subject}` listing pages.
pub struct ClassPageFetcher {
    pub base_url: String,
    client: Client,
    limiter: RateLimiter<NotKeyed, InMemoryState, QuantaClock>,
}

impl ClassPageFetcher {
    /// Creates a fetcher for the given schedule root.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AvailabilityError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("seat-watch/0.1"));
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            limiter: RateLimiter::direct(Quota::per_second(FETCHES_PER_SECOND)),
        })
    }

    pub fn page_url(&self, quarter: &str, subject: &str) -> String {
        format!(
            "{}/{quarter}/{subject}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Downloads the listing page for one (quarter, subject) pair.
    pub async fn fetch_page(&self, quarter: &str, subject: &str) -> Result<String, AvailabilityError> {
        if self.limiter.check().is_err() {
            info!("Class page fetches are ratelimited. Waiting...");
        }
        self.limiter.until_ready().await;

        let url = self.page_url(quarter, subject);
        debug!("Making request to: {url}");
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvailabilityError::PageNotFound {
                url,
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl AvailabilitySource for ClassPageFetcher {
    async fn fetch_seats(
        &self,
        quarter: &str,
        subject: &str,
        class_ids: &[String],
    ) -> Vec<ClassAvailability> {
        debug!("Getting seats for {quarter}/{subject}: {class_ids:?}");
        match self.fetch_page(quarter, subject).await {
            Ok(html) => extract_availability(&html, class_ids),
            Err(e) => {
                warn!("No page for quarter `{quarter}` and subject `{subject}`: {e}");
                vec![ClassAvailability::NotFound; class_ids.len()]
            }
        }
    }
}

/// Reads the availability cell of every class id from a listing page.
///
/// Cells are located by `availability-{class_id}` id prefix. Missing or
/// unparseable cells resolve to [`ClassAvailability::NotFound`].
pub fn extract_availability(html: &str, class_ids: &[String]) -> Vec<ClassAvailability> {
    class_ids
        .iter()
        .map(|class_id| {
            let Some(text) = find_cell_text(html, &format!("availability-{class_id}")) else {
                warn!("No availability cell found for class id `{class_id}`");
                return ClassAvailability::NotFound;
            };
            match parse_seats(&text) {
                Ok(seats) => ClassAvailability::Seats(seats),
                Err(e) => {
                    warn!("Skipping class id `{class_id}`: {e}");
                    ClassAvailability::NotFound
                }
            }
        })
        .collect()
}
