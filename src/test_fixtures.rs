//! Shared test fixtures: an in-memory [`Fetcher`] and sample payloads

use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, Link, parse_link_header};
use crate::request::RequestParam;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum StubResponse {
    Body {
        bytes: Vec<u8>,
        delay: Duration,
        link: Option<String>,
    },
    Status(u16),
    Panic,
}

/// [`Fetcher`] answering from a path-keyed table
///
/// Unknown paths answer 404, like a real server would.
pub(crate) struct StubFetcher {
    responses: Mutex<HashMap<String, StubResponse>>,
    seen: Mutex<Vec<RequestParam>>,
    in_flight: AtomicUsize,
    peak: Arc<AtomicUsize>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            seen: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn insert(&self, path: &str, response: StubResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), response);
    }

    pub(crate) fn insert_delayed(&self, path: &str, body: &str, delay: Duration) {
        self.insert(
            path,
            StubResponse::Body {
                bytes: body.as_bytes().to_vec(),
                delay,
                link: None,
            },
        );
    }

    pub(crate) fn with_body(self, path: &str, body: &str) -> Self {
        self.insert_delayed(path, body, Duration::ZERO);
        self
    }

    pub(crate) fn with_delayed_body(self, path: &str, body: &str, delay: Duration) -> Self {
        self.insert_delayed(path, body, delay);
        self
    }

    pub(crate) fn with_bytes(self, path: &str, bytes: Vec<u8>) -> Self {
        self.insert(
            path,
            StubResponse::Body {
                bytes,
                delay: Duration::ZERO,
                link: None,
            },
        );
        self
    }

    pub(crate) fn with_link_header(self, path: &str, link: &str) -> Self {
        self.insert(
            path,
            StubResponse::Body {
                bytes: Vec::new(),
                delay: Duration::ZERO,
                link: Some(link.to_string()),
            },
        );
        self
    }

    pub(crate) fn with_status(self, path: &str, status: u16) -> Self {
        self.insert(path, StubResponse::Status(status));
        self
    }

    pub(crate) fn with_panic(self, path: &str) -> Self {
        self.insert(path, StubResponse::Panic);
        self
    }

    /// Highest number of fetches observed in flight at once
    pub(crate) fn peak_in_flight(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.peak)
    }

    /// Requests received so far, in arrival order
    pub(crate) fn seen(&self) -> Vec<RequestParam> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn respond(&self, request: &RequestParam) -> Result<(Vec<u8>, Option<String>)> {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let (outcome, delay) = {
            let responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
            match responses.get(&request.path) {
                Some(StubResponse::Body { bytes, delay, link }) => {
                    (Ok((bytes.clone(), link.clone())), *delay)
                }
                Some(StubResponse::Status(status)) => (Err(*status), Duration::ZERO),
                Some(StubResponse::Panic) => panic!("stub fetcher asked to fail on {}", request.path),
                None => (Err(404), Duration::ZERO),
            }
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        outcome.map_err(|status| Error::HttpFailed {
            status,
            url: format!("stub://{}", request.path),
        })
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &RequestParam) -> Result<Vec<u8>> {
        self.respond(request).await.map(|(bytes, _)| bytes)
    }

    async fn fetch_links(&self, request: &RequestParam) -> Result<HashMap<String, Link>> {
        let (_, link) = self.respond(request).await?;
        Ok(link.map(|l| parse_link_header(&l)).unwrap_or_default())
    }
}

/// Listing page with one track per id
pub(crate) fn track_list_json(ids: &[&str]) -> String {
    let tracks: Vec<Value> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            json!({
                "id": id,
                "length": 1.5 + i as f64,
                "begin": "2020-06-01T10:00:00Z",
                "end": "2020-06-01T10:30:00Z",
                "sensor": {
                    "type": "car",
                    "properties": {
                        "manufacturer": "Volkswagen",
                        "fuelType": "diesel",
                        "constructionYear": 2014
                    }
                }
            })
        })
        .collect();
    json!({ "tracks": tracks }).to_string()
}

/// GeoJSON track with `points` Point features
pub(crate) fn track_json(id: &str, points: usize) -> String {
    let features: Vec<Value> = (0..points)
        .map(|i| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [7.60 + i as f64 * 0.001, 51.95 + i as f64 * 0.001]
                },
                "properties": {
                    "id": format!("{id}-m{i}"),
                    "time": format!("2020-06-01T10:00:{:02}Z", i % 60),
                    "phenomenons": {
                        "Speed": { "value": 30.0 + i as f64, "unit": "km/h" },
                        "GPS Accuracy": { "value": 4.0, "unit": "%" },
                        "GPS Speed": { "value": 29.5 + i as f64, "unit": "km/h" },
                        "CO2": { "value": 12.25, "unit": "kg/h" }
                    }
                }
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "properties": {
            "id": id,
            "length": 3.25,
            "begin": "2020-06-01T10:00:00Z",
            "end": "2020-06-01T10:30:00Z",
            "sensor": {
                "type": "car",
                "properties": {
                    "id": "sensor-1",
                    "manufacturer": "Volkswagen",
                    "model": "Golf",
                    "fuelType": "diesel"
                }
            }
        },
        "features": features
    })
    .to_string()
}
