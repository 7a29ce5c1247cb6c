//! # NOAA Tide Prediction Feed
//!
//! This module fetches high/low tide predictions from the NOAA CO-OPS data
//! API and decodes them into typed records for the extractor.
//!
//! ## Data Source
//!
//! ### NOAA CO-OPS datagetter
//! - **URL**: https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//! - **Product**: `predictions` with `interval=hilo` (extrema only, not the
//!   full curve — four-ish records per day instead of hundreds)
//! - **Window**: previous day through next day, so the extractor sees both
//!   past and future extrema and can build a full interpolation bracket
//! - **Fields consumed**: local time string (`YYYY-MM-DD HH:MM`), kind code
//!   (`H`/`L`), height in feet
//!
//! ## Error Handling
//!
//! The fetch path distinguishes transport failures from payload failures so
//! the orchestrator can log them separately; both leave the cached schedule
//! untouched and retry on the next wake. An empty prediction list is a
//! decode-level failure: a schedule refreshed from it would contain no
//! anchors at all, which is strictly worse than the stale one we have.

use crate::config::Config;
use chrono::{DateTime, Duration, Local};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while fetching or decoding the prediction feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// HTTP request failed (network, server, or protocol error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload could not be decoded into prediction records
    #[error("decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Feed answered with zero prediction records
    #[error("feed returned no predictions")]
    Empty,
}

/// One raw prediction record as the feed delivers it.
///
/// All fields arrive as strings; parsing into timestamps and numbers is the
/// extractor's job, where a malformed record can be skipped instead of
/// failing the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    /// Local station time, `YYYY-MM-DD HH:MM`
    #[serde(rename = "t")]
    pub time: String,
    /// Predicted height in feet, decimal string
    #[serde(rename = "v")]
    pub height: String,
    /// Kind code: `H` for high water, `L` for low water
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
struct PredictionsPayload {
    predictions: Vec<RawPrediction>,
}

/// Source of raw prediction records for a station.
///
/// The orchestrator only ever talks to this trait; tests substitute a mock
/// that returns canned records or errors.
pub trait PredictionSource {
    /// Fetch hilo prediction records covering roughly a day either side of
    /// `around` for the given station.
    fn fetch(&self, station_id: &str, around: DateTime<Local>)
        -> Result<Vec<RawPrediction>, FeedError>;
}

/// NOAA CO-OPS client backed by reqwest.
pub struct NoaaClient {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    api_url: String,
}

impl NoaaClient {
    /// Build a client from configuration. The tokio runtime is created by
    /// the caller (the binary) and owned here for the process lifetime.
    pub fn new(config: &Config, runtime: tokio::runtime::Runtime) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timing.http_timeout_secs))
            .build()?;
        Ok(NoaaClient {
            http,
            runtime,
            api_url: config.station.api_url.clone(),
        })
    }
}

impl PredictionSource for NoaaClient {
    fn fetch(
        &self,
        station_id: &str,
        around: DateTime<Local>,
    ) -> Result<Vec<RawPrediction>, FeedError> {
        // Window: start yesterday, span 48 hours. Past extrema feed the
        // last* anchors, future ones the next* anchors.
        let begin_date = (around - Duration::days(1)).format("%Y%m%d").to_string();

        let body = self.runtime.block_on(async {
            self.http
                .get(&self.api_url)
                .query(&[
                    ("product", "predictions"),
                    ("interval", "hilo"),
                    ("station", station_id),
                    ("begin_date", begin_date.as_str()),
                    ("range", "48"),
                    ("datum", "MLLW"),
                    ("time_zone", "lst_ldt"),
                    ("units", "english"),
                    ("format", "json"),
                ])
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        })?;

        decode_predictions(&body)
    }
}

/// Decode the feed payload into raw records.
///
/// Split out from the HTTP path so malformed-payload handling is testable
/// without a server.
pub fn decode_predictions(body: &str) -> Result<Vec<RawPrediction>, FeedError> {
    let payload: PredictionsPayload = serde_json::from_str(body)?;
    if payload.predictions.is_empty() {
        return Err(FeedError::Empty);
    }
    Ok(payload.predictions)
}
