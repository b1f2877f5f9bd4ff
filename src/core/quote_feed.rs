use crate::core::errors::QuoteSourceError;
use crate::core::quote_channel::{QuoteSource, WaitOutcome};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str = "http://127.0.0.1:7777/quote";
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct FeedCredentials {
    pub user: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
struct QuoteSnapshot {
    #[serde(default)]
    last_price: Option<f64>,
}

/// Polls a JSON quote endpoint once per interval. The wait granularity is the poll interval.
pub struct HttpQuoteSource {
    client: reqwest::blocking::Client,
    url: String,
    instrument: String,
    credentials: FeedCredentials,
    interval: Duration,
    last_price: Option<f64>,
    polled_once: bool,
    closed: bool,
}

impl HttpQuoteSource {
    pub fn new(url: String, instrument: String, credentials: FeedCredentials) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url,
            instrument,
            credentials,
            interval: POLL_INTERVAL,
            last_price: None,
            polled_once: false,
            closed: false,
        })
    }

    fn fetch(&self) -> Result<Option<f64>> {
        let snapshot: QuoteSnapshot = self
            .client
            .get(&self.url)
            .query(&[("symbol", self.instrument.as_str())])
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .send()
            .with_context(|| format!("request to {} failed", self.url))?
            .error_for_status()
            .context("quote feed rejected the request")?
            .json()
            .context("quote feed returned malformed JSON")?;
        Ok(snapshot.last_price.filter(|p| p.is_finite()))
    }
}

impl QuoteSource for HttpQuoteSource {
    fn wait_update(&mut self) -> Result<WaitOutcome, QuoteSourceError> {
        if self.closed {
            return Ok(WaitOutcome::Closed);
        }
        if self.polled_once {
            std::thread::sleep(self.interval);
        }
        self.polled_once = true;
        self.last_price = self
            .fetch()
            .map_err(|e| QuoteSourceError::new(format!("{:#}", e)))?;
        Ok(WaitOutcome::Updated)
    }

    fn last_price(&self) -> Result<Option<f64>, QuoteSourceError> {
        Ok(self.last_price)
    }

    fn close(&mut self) -> Result<(), QuoteSourceError> {
        self.closed = true;
        Ok(())
    }
}
