//! Request descriptors and query filters
//!
//! A [`RequestParam`] describes one HTTP request relative to the configured base
//! URL. It is a plain value: resolving the path and talking to the network is
//! the job of a [`Fetcher`](crate::fetcher::Fetcher).

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use std::collections::BTreeMap;

/// Query parameter carrying the page number in paged listings
pub const PAGE_PARAM: &str = "page";
/// Query parameter carrying the page size in paged listings
pub const LIMIT_PARAM: &str = "limit";

/// Immutable description of one HTTP request
///
/// Two descriptors with equal fields are interchangeable. The path is kept
/// relative (e.g. `tracks/5f1a...`) and only resolved at fetch time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestParam {
    /// Path relative to the base URL
    pub path: String,
    /// HTTP method (default: GET)
    pub method: Method,
    /// Query parameters
    pub params: BTreeMap<String, String>,
    /// Extra request headers
    pub headers: BTreeMap<String, String>,
}

impl RequestParam {
    /// GET request for `path` without parameters or headers
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::GET,
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
        }
    }

    /// Copy of this request with one query parameter set (or replaced)
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Copy of this request with all `params` merged in, overriding existing keys
    #[must_use]
    pub fn with_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        for (key, value) in params {
            self.params.insert(key.into(), value.to_string());
        }
        self
    }

    /// Copy of this request with one header set (or replaced)
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Copy of this request using `method`
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Value of a query parameter, if set
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Spatial filter: `min_x, min_y, max_x, max_y` in WGS84 degrees
///
/// The coordinates are passed through as given. An inverted box is not an
/// error; the service simply matches nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BboxSelector {
    /// Western longitude
    pub min_x: f64,
    /// Southern latitude
    pub min_y: f64,
    /// Eastern longitude
    pub max_x: f64,
    /// Northern latitude
    pub max_y: f64,
}

impl BboxSelector {
    /// Create a bounding box from its four corners
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Query parameters contributed by this filter
    pub fn params(&self) -> [(String, String); 1] {
        [(
            "bbox".to_string(),
            format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y),
        )]
    }
}

impl From<[f64; 4]> for BboxSelector {
    fn from(c: [f64; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

/// Temporal filter on track recording time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSelector {
    /// Interval start (inclusive)
    pub start: DateTime<Utc>,
    /// Interval end (inclusive)
    pub end: DateTime<Utc>,
}

impl TimeSelector {
    /// Create a time interval
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Query parameters contributed by this filter
    ///
    /// Rendered as `during=2020-04-01T00:00:00Z,2021-04-15T00:00:00Z`.
    pub fn params(&self) -> [(String, String); 1] {
        [(
            "during".to_string(),
            format!(
                "{},{}",
                self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
                self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        )]
    }
}
