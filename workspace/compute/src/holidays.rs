//! Advisory holiday lookup used to flag non-instructional days.
//!
//! Holidays never fail a report: callers treat lookup errors as "no holidays
//! known" and surface that fact to the client.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::error::{ComputeError, Result};

/// Source of holiday dates, keyed by year.
#[async_trait]
pub trait HolidayCalendar: Send + Sync + fmt::Debug {
    async fn holidays_for_year(&self, year: i32) -> Result<BTreeSet<NaiveDate>>;
}

/// Calendar used when no holiday source is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHolidays;

#[async_trait]
impl HolidayCalendar for NoHolidays {
    async fn holidays_for_year(&self, _year: i32) -> Result<BTreeSet<NaiveDate>> {
        Ok(BTreeSet::new())
    }
}

/// Fixed set of holiday dates.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidays {
    dates: BTreeSet<NaiveDate>,
}

impl StaticHolidays {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }
}

#[async_trait]
impl HolidayCalendar for StaticHolidays {
    async fn holidays_for_year(&self, year: i32) -> Result<BTreeSet<NaiveDate>> {
        Ok(self
            .dates
            .iter()
            .filter(|d| d.year() == year)
            .copied()
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct HolidayEntry {
    #[serde(default)]
    date: Option<String>,
}

/// Fetches holidays from `GET <url>?year=<year>`, which answers with a JSON
/// array of objects carrying a `date` field in `Y-M-D` form.
#[derive(Debug, Clone)]
pub struct HttpHolidayCalendar {
    client: reqwest::Client,
    url: String,
}

impl HttpHolidayCalendar {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComputeError::HolidayLookup(format!("failed to build client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl HolidayCalendar for HttpHolidayCalendar {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn holidays_for_year(&self, year: i32) -> Result<BTreeSet<NaiveDate>> {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        let response = self
            .client
            .get(format!("{}{}year={}", self.url, separator, year))
            .send()
            .await
            .map_err(|e| ComputeError::HolidayLookup(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ComputeError::HolidayLookup(format!(
                "holiday source answered {}",
                response.status()
            )));
        }

        let entries: Vec<HolidayEntry> = response
            .json()
            .await
            .map_err(|e| ComputeError::HolidayLookup(format!("invalid response body: {}", e)))?;

        let dates: BTreeSet<NaiveDate> = entries
            .iter()
            .filter_map(|entry| entry.date.as_deref().and_then(parse_loose_date))
            .collect();
        debug!(entries = entries.len(), dates = dates.len(), "Fetched holidays");
        Ok(dates)
    }
}

/// Parses `Y-M-D` with optionally unpadded month and day.
fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().splitn(3, '-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Caches successful lookups of an inner calendar per year. Failures are not cached.
pub struct CachedHolidayCalendar {
    inner: Arc<dyn HolidayCalendar>,
    cache: Cache<i32, Arc<BTreeSet<NaiveDate>>>,
}

impl CachedHolidayCalendar {
    pub fn new(inner: Arc<dyn HolidayCalendar>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }
}

impl fmt::Debug for CachedHolidayCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedHolidayCalendar")
            .field("inner", &self.inner)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl HolidayCalendar for CachedHolidayCalendar {
    async fn holidays_for_year(&self, year: i32) -> Result<BTreeSet<NaiveDate>> {
        let inner = self.inner.clone();
        let dates = self
            .cache
            .try_get_with(year, async move {
                inner.holidays_for_year(year).await.map(Arc::new)
            })
            .await
            .map_err(|e: Arc<ComputeError>| {
                warn!(year, error = %e, "Holiday lookup failed");
                ComputeError::HolidayLookup(e.to_string())
            })?;
        Ok(dates.as_ref().clone())
    }
}
