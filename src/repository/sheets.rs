//! [`RowStore`] over the Google Sheets v4 values API.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use log::warn;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use wreq::Client;
use wreq::RequestBuilder;
use wreq::Response;
use wreq::StatusCode;
use wreq::header::AUTHORIZATION;
use wreq::header::CONTENT_TYPE;
use wreq::header::HeaderMap;
use wreq::header::HeaderValue;
use wreq::header::USER_AGENT;

use crate::repository::Row;
use crate::repository::RowStore;
use crate::repository::error::StoreError;
use crate::repository::token::AccessTokenSource;

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<RangeUpdate>,
}

#[derive(Serialize)]
struct RangeUpdate {
    range: String,
    values: Vec<Vec<String>>,
}

/// One sheet of a spreadsheet, addressed by name.
pub struct SheetsRowStore {
    pub api_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    tokens: Arc<dyn AccessTokenSource>,
    client: Client,
    headers: OnceCell<Vec<String>>,
}

impl SheetsRowStore {
    pub fn new(
        api_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("seat-watch/0.1"));
        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            api_url: api_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            tokens,
            client,
            headers: OnceCell::new(),
        })
    }

    /// Column headers from row 1, read once per store.
    async fn headers(&self) -> Result<&Vec<String>, StoreError> {
        self.headers
            .get_or_try_init(|| async {
                let range = self.get_range(&format!("{}!1:1", self.sheet_ref())).await?;
                let headers: Vec<String> = range
                    .values
                    .into_iter()
                    .next()
                    .unwrap_or_default()
                    .iter()
                    .map(cell_text)
                    .collect();
                debug!("Loaded sheet headers: {headers:?}");
                Ok(headers)
            })
            .await
    }

    async fn get_range(&self, range: &str) -> Result<ValueRange, StoreError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_url.trim_end_matches('/'),
            self.spreadsheet_id,
            encode_range(range)
        );
        debug!("Making request to: {url}");
        let response = self
            .send_authorized(|| self.client.get(url.as_str()))
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn batch_update(&self, request: &BatchUpdateRequest) -> Result<(), StoreError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values:batchUpdate",
            self.api_url.trim_end_matches('/'),
            self.spreadsheet_id
        );
        debug!("Making request to: {url}");
        let body = serde_json::to_string(request)?;
        let response = self
            .send_authorized(|| {
                self.client
                    .post(url.as_str())
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone())
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message: response.text().await?,
            });
        }
        Ok(())
    }

    /// Sends the request built by `request` with a bearer token.
    ///
    /// A `401` renews the token once and resends.
    async fn send_authorized(
        &self,
        request: impl Fn() -> RequestBuilder,
    ) -> Result<Response, StoreError> {
        let token = self.tokens.access_token().await?;
        let response = request()
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!("Sheets API rejected the access token. Renewing it.");
        self.tokens.invalidate().await;
        let token = self.tokens.access_token().await?;
        Ok(request()
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?)
    }

    /// Sheet name as used in A1 notation, quoted when it is not a bare word.
    fn sheet_ref(&self) -> String {
        if self.sheet_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.sheet_name.clone()
        } else {
            format!("'{}'", self.sheet_name.replace('\'', "''"))
        }
    }
}

#[async_trait]
impl RowStore for SheetsRowStore {
    async fn get_last_row_index(&self) -> Result<u32, StoreError> {
        let range = self.get_range(&self.sheet_ref()).await?;
        Ok(range.values.len() as u32)
    }

    async fn get_rows(&self, start: u32, end: u32) -> Result<Vec<Row>, StoreError> {
        if end < start {
            return Ok(Vec::new());
        }
        let headers = self.headers().await?;
        let range = self
            .get_range(&format!("{}!{start}:{end}", self.sheet_ref()))
            .await?;

        Ok(range
            .values
            .iter()
            .map(|cells| {
                headers
                    .iter()
                    .enumerate()
                    .filter(|(_, header)| !header.is_empty())
                    .map(|(i, header)| {
                        let text = cells.get(i).map(cell_text).unwrap_or_default();
                        (header.clone(), text)
                    })
                    .collect()
            })
            .collect())
    }

    async fn set_row(&self, index: u32, fields: Row) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }
        let headers = self.headers().await?;
        let sheet = self.sheet_ref();

        let data = fields
            .into_iter()
            .map(|(column, value)| {
                let position = headers
                    .iter()
                    .position(|h| *h == column)
                    .ok_or_else(|| StoreError::UnknownColumn {
                        column: column.clone(),
                    })?;
                Ok(RangeUpdate {
                    range: format!("{sheet}!{}{index}", column_letter(position)),
                    values: vec![vec![value]],
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        self.batch_update(&BatchUpdateRequest {
            value_input_option: "RAW",
            data,
        })
        .await
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 column name for a zero-based column position.
fn column_letter(mut position: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (position % 26) as u8);
        if position < 26 {
            break;
        }
        position = position / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Percent-encodes an A1 range for use as a path segment.
fn encode_range(range: &str) -> String {
    let mut out = String::with_capacity(range.len());
    for b in range.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'!' | b':' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
