//! Bounded-concurrency batch downloads
//!
//! [`DownloadClient`] runs a list of [`RequestParam`]s through a [`Fetcher`]
//! with at most `pool_size` requests in flight, then hands the order-aligned
//! results to a [`Decoder`] once.
//!
//! Failure isolation works at two levels:
//! - a failed fetch becomes an absent entry (`None`) and a warning, the rest
//!   of the batch carries on
//! - if the batch task itself breaks down, the whole result degrades to an
//!   empty list, logged at `error` and announced as
//!   [`DownloadEvent::BatchAborted`]

use crate::config::Config;
use crate::decode::Decoder;
use crate::error::{Error, Result};
use crate::fetcher::{Fetcher, HttpFetcher, Link};
use crate::request::RequestParam;
use crate::table::{Cell, Table};
use crate::types::{DownloadEvent, RawResult};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, error, warn};

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Column used when a batch is downloaded without a decoder
pub const RAW_BODY_COLUMN: &str = "body";

/// Concurrent downloader shared by all API wrappers
pub struct DownloadClient {
    fetcher: Arc<dyn Fetcher>,
    pool_size: usize,
    event_tx: broadcast::Sender<DownloadEvent>,
}

impl DownloadClient {
    /// Create a client talking HTTP according to `config`
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config.pool_size))
    }

    /// Create a client on top of any [`Fetcher`]
    ///
    /// A `pool_size` of zero is treated as one.
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, pool_size: usize) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            fetcher,
            pool_size: pool_size.max(1),
            event_tx,
        }
    }

    /// Maximum number of concurrent fetches per batch
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Subscribe to batch progress events
    ///
    /// Each subscriber receives every event independently; a subscriber that
    /// falls more than 1000 events behind observes a lag error.
    pub fn subscribe(&self) -> broadcast::Receiver<DownloadEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: DownloadEvent) {
        // no subscribers is fine
        self.event_tx.send(event).ok();
    }

    /// Fetch every request and return the bodies in request order
    ///
    /// Never fails: failed items are `None`, and a broken batch yields an
    /// empty list.
    pub async fn download_raw(&self, requests: Vec<RequestParam>) -> Vec<RawResult> {
        let total = requests.len();
        self.emit(DownloadEvent::BatchStarted { total });

        let fetcher = Arc::clone(&self.fetcher);
        let event_tx = self.event_tx.clone();
        let concurrency = self.pool_size;

        // One task per batch, aborted when this future is dropped. Joining it
        // also contains a panic inside a fetch.
        let batch = AbortOnDropHandle::new(tokio::spawn(async move {
            let mut results: Vec<(usize, RawResult)> = stream::iter(requests.into_iter().enumerate())
                .map(|(index, request)| {
                    let fetcher = Arc::clone(&fetcher);
                    let event_tx = event_tx.clone();

                    async move {
                        let raw = match fetch_text(fetcher.as_ref(), &request).await {
                            Ok(body) => Some(body),
                            Err(e) => {
                                warn!(
                                    index,
                                    path = %request.path,
                                    error = %e,
                                    "Download failed, item will be absent"
                                );
                                None
                            }
                        };
                        event_tx
                            .send(DownloadEvent::ItemCompleted {
                                index,
                                success: raw.is_some(),
                            })
                            .ok();
                        (index, raw)
                    }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

            // Completion order is arbitrary; restore request order
            results.sort_unstable_by_key(|(index, _)| *index);
            results.into_iter().map(|(_, raw)| raw).collect::<Vec<_>>()
        }));

        match batch.await {
            Ok(results) => {
                let succeeded = results.iter().filter(|r| r.is_some()).count();
                let failed = results.len() - succeeded;
                debug!(total, succeeded, failed, "Download batch finished");
                self.emit(DownloadEvent::BatchFinished { succeeded, failed });
                results
            }
            Err(e) => {
                error!(total, error = %e, "Download batch failed, returning empty result");
                self.emit(DownloadEvent::BatchAborted {
                    error: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Download a batch and decode it in one pass
    ///
    /// Without a decoder the bodies are returned as a one-column table
    /// ([`RAW_BODY_COLUMN`]) with nulls for failed items.
    ///
    /// # Errors
    /// Only decode errors propagate; transport failures are absorbed per item.
    pub async fn download(
        &self,
        requests: Vec<RequestParam>,
        decoder: Option<&dyn Decoder>,
        post_process: bool,
    ) -> Result<Table> {
        let results = self.download_raw(requests).await;
        match decoder {
            Some(decoder) => decoder.decode(&results, post_process),
            None => Ok(raw_table(results)),
        }
    }

    /// Download a single request through the batch path
    pub async fn download_one(
        &self,
        request: RequestParam,
        decoder: Option<&dyn Decoder>,
        post_process: bool,
    ) -> Result<Table> {
        self.download(vec![request], decoder, post_process).await
    }

    /// Fetch the `Link` relations of one request
    ///
    /// # Errors
    /// Transport errors propagate: there is no batch to absorb them.
    pub async fn download_links(&self, request: &RequestParam) -> Result<HashMap<String, Link>> {
        self.fetcher.fetch_links(request).await
    }

    /// Fetch one request and store its body under `output_dir/<request path>`
    ///
    /// Missing parent directories are created. Returns the written file path.
    ///
    /// # Errors
    /// Returns error if the fetch fails, the path would leave `output_dir`, or
    /// the file cannot be written.
    pub async fn download_and_save(
        &self,
        request: &RequestParam,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let relative = Path::new(request.path.trim_start_matches('/'));
        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(Error::InvalidQuery(format!(
                "cannot save '{}' below {}",
                request.path,
                output_dir.display()
            )));
        }

        let content = self.fetcher.fetch(request).await?;
        let file_path = output_dir.join(relative);
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&file_path, &content).await?;

        debug!(path = %file_path.display(), bytes = content.len(), "Saved response body");
        Ok(file_path)
    }
}

async fn fetch_text(fetcher: &dyn Fetcher, request: &RequestParam) -> Result<String> {
    let bytes = fetcher.fetch(request).await?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Decode(format!("response for '{}' is not UTF-8: {}", request.path, e)))
}

fn raw_table(results: Vec<RawResult>) -> Table {
    Table::from_records(results.into_iter().map(|raw| {
        vec![(
            RAW_BODY_COLUMN.to_string(),
            raw.map_or(Cell::Null, Cell::Text),
        )]
    }))
}
