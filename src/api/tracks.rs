//! Track queries: page planning, listing filter, detail download
//!
//! A listing query is answered in two rounds. The first round downloads the
//! listing pages needed to cover `num_results` and collects track ids; the
//! second round downloads the full document of every surviving id. Both rounds
//! go through the same [`DownloadClient`], so each is bounded by its pool size
//! and isolates per-item failures.

use super::Endpoints;
use crate::config::Config;
use crate::decode::{TrackDecoder, TrackListDecoder};
use crate::download::DownloadClient;
use crate::error::{Error, Result};
use crate::request::{BboxSelector, LIMIT_PARAM, PAGE_PARAM, RequestParam, TimeSelector};
use crate::table::Table;
use crate::types::TrackId;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Column of a listing table holding the track id
pub const TRACK_ID_COLUMN: &str = "track.id";

/// Relation of the `Link` header pointing at the final listing page
const LAST_RELATION: &str = "last";

/// Parameters of a track listing query
///
/// ```
/// use envirocar_client::api::TrackQuery;
/// use envirocar_client::request::BboxSelector;
///
/// let query = TrackQuery::default()
///     .with_bbox(BboxSelector::new(7.59, 51.95, 7.62, 51.96))
///     .with_num_results(Some(3));
/// assert_eq!(query.page_limit, 100);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TrackQuery {
    /// Restrict the listing to one user's tracks
    pub username: Option<String>,
    /// Spatial filter
    pub bbox: Option<BboxSelector>,
    /// Temporal filter
    pub time_interval: Option<TimeSelector>,
    /// Maximum number of tracks; `None` means every track the service lists
    pub num_results: Option<usize>,
    /// Tracks per listing page (default: 100)
    pub page_limit: usize,
    /// Tracks to leave out, e.g. because they were downloaded before
    pub skip_tracks: HashSet<TrackId>,
}

impl Default for TrackQuery {
    fn default() -> Self {
        Self {
            username: None,
            bbox: None,
            time_interval: None,
            num_results: Some(10),
            page_limit: 100,
            skip_tracks: HashSet::new(),
        }
    }
}

impl TrackQuery {
    /// Restrict to the tracks of `username`
    #[must_use]
    pub fn for_user(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Add a spatial filter
    #[must_use]
    pub fn with_bbox(mut self, bbox: BboxSelector) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Add a temporal filter
    #[must_use]
    pub fn with_time_interval(mut self, interval: TimeSelector) -> Self {
        self.time_interval = Some(interval);
        self
    }

    /// Set the result cap (`None` for all)
    #[must_use]
    pub fn with_num_results(mut self, num_results: Option<usize>) -> Self {
        self.num_results = num_results;
        self
    }

    /// Set the listing page size
    #[must_use]
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Skip the given track ids
    #[must_use]
    pub fn skipping<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackId>,
    {
        self.skip_tracks.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Filter parameters shared by every page of the listing
    fn filter_params(&self) -> impl Iterator<Item = (String, String)> {
        self.bbox
            .iter()
            .flat_map(BboxSelector::params)
            .chain(self.time_interval.iter().flat_map(TimeSelector::params))
    }
}

/// Access to the track endpoints of the enviroCar API
///
/// Results are [`Table`]s: [`TrackApi::get_tracks`] yields one row per
/// measurement point with the flattened track and sensor metadata broadcast
/// onto each row, [`TrackApi::get_track`] yields the reduced, typed
/// projection of a single track.
pub struct TrackApi {
    client: Arc<DownloadClient>,
    endpoints: Endpoints,
}

impl TrackApi {
    /// Create an API handle with its own HTTP download client
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(Arc::new(DownloadClient::new(config)?)))
    }

    /// Create an API handle on top of an existing download client
    pub fn with_client(client: Arc<DownloadClient>) -> Self {
        Self {
            client,
            endpoints: Endpoints::default(),
        }
    }

    /// Replace the endpoint paths
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// The download client, e.g. to subscribe to progress events
    pub fn client(&self) -> &DownloadClient {
        &self.client
    }

    /// The endpoint paths in use
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Number of listing pages for `path` with the given parameters
    ///
    /// Probes once and reads the `page` query parameter of the `last` link.
    /// Without a `last` link there is exactly one page.
    ///
    /// # Errors
    /// Transport errors of the probe propagate. A `last` link without a
    /// usable `page` parameter is [`Error::Pagination`].
    pub async fn get_max_page(&self, path: &str, params: &BTreeMap<String, String>) -> Result<u32> {
        let probe = RequestParam::new(path).with_params(params.clone());
        let links = self.client.download_links(&probe).await?;

        let Some(last) = links.get(LAST_RELATION) else {
            debug!(path, "No last link, single page");
            return Ok(1);
        };

        let page = last
            .query_param(PAGE_PARAM)
            .and_then(|page| page.parse::<u32>().ok())
            .ok_or_else(|| {
                Error::Pagination(format!(
                    "last link '{}' has no numeric '{PAGE_PARAM}' parameter",
                    last.url
                ))
            })?;

        debug!(path, max_page = page, "Resolved page count");
        Ok(page.max(1))
    }

    /// Download the tracks matching `query`, one row per measurement point
    ///
    /// An empty table means nothing matched (or every match was skipped or
    /// failed to download).
    ///
    /// # Errors
    /// Returns [`Error::InvalidQuery`] for a zero `page_limit`. Decode errors
    /// and a failing page-count probe propagate; per-item download failures
    /// do not.
    pub async fn get_tracks(&self, query: &TrackQuery) -> Result<Table> {
        if query.page_limit == 0 {
            return Err(Error::InvalidQuery("page_limit must be at least 1".into()));
        }

        let path = self.endpoints.listing(query.username.as_deref());
        let base = RequestParam::new(path.as_str())
            .with_param(LIMIT_PARAM, query.page_limit)
            .with_param(PAGE_PARAM, 1)
            .with_params(query.filter_params());

        let num_results = match query.num_results {
            Some(n) => n,
            None => {
                let pages = self.get_max_page(&path, &base.params).await?;
                (pages as usize).saturating_mul(query.page_limit)
            }
        };

        let pages = plan_pages(&base, num_results, query.page_limit);
        info!(path = %path, pages = pages.len(), num_results, "Downloading tracks metadata");
        let listing = self
            .client
            .download(pages, Some(&TrackListDecoder), false)
            .await?;

        let ids = select_track_ids(&listing, &query.skip_tracks, num_results)?;
        if ids.is_empty() {
            info!(path = %path, "No tracks matched");
            return Ok(Table::new());
        }

        info!(tracks = ids.len(), "Downloading tracks");
        self.get_tracks_by_ids(&ids).await
    }

    /// Download the full documents of the given tracks, unreduced
    ///
    /// Tracks that fail to download are missing from the result.
    ///
    /// # Errors
    /// Only decode errors propagate.
    pub async fn get_tracks_by_ids(&self, ids: &[TrackId]) -> Result<Table> {
        let requests = ids
            .iter()
            .map(|id| RequestParam::new(self.endpoints.track(id.as_str())))
            .collect();
        self.client
            .download(requests, Some(&TrackDecoder), false)
            .await
    }

    /// Download one track in its reduced, typed projection
    ///
    /// A track that cannot be downloaded yields an empty table.
    ///
    /// # Errors
    /// Decode and coercion errors propagate.
    pub async fn get_track(&self, track_id: &str) -> Result<Table> {
        let request = RequestParam::new(self.endpoints.track(track_id));
        self.client
            .download_one(request, Some(&TrackDecoder), true)
            .await
    }
}

/// One request per page, starting at page 1, until `num_results` are covered
fn plan_pages(base: &RequestParam, num_results: usize, page_limit: usize) -> Vec<RequestParam> {
    let pages = num_results.div_ceil(page_limit);
    (1..=pages)
        .map(|page| base.clone().with_param(PAGE_PARAM, page))
        .collect()
}

/// Track ids of a listing in listing order, minus `skip`, capped at `limit`
fn select_track_ids(listing: &Table, skip: &HashSet<TrackId>, limit: usize) -> Result<Vec<TrackId>> {
    if listing.is_empty() {
        return Ok(Vec::new());
    }
    let column = listing.column(TRACK_ID_COLUMN).ok_or_else(|| {
        Error::Decode(format!("track listing has no '{TRACK_ID_COLUMN}' column"))
    })?;

    Ok(column
        .filter(|cell| !cell.is_null())
        .map(|cell| TrackId::new(cell.to_string()))
        .filter(|id| !skip.contains(id))
        .take(limit)
        .collect())
}
