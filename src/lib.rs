//! # envirocar-client
//!
//! Client library for the enviroCar vehicle track API.
//!
//! ## Design Philosophy
//!
//! envirocar-client is designed to be:
//! - **Concurrent** - Batches of requests run with bounded parallelism
//! - **Failure tolerant** - A failed download leaves a gap, never aborts the batch
//! - **Tabular** - Nested JSON and GeoJSON payloads are flattened into [`Table`]s
//! - **Event-driven** - Consumers subscribe to batch progress, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use envirocar_client::api::{TrackApi, TrackQuery};
//! use envirocar_client::request::BboxSelector;
//! use envirocar_client::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = TrackApi::new(&Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = api.client().subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let query = TrackQuery::default()
//!         .with_bbox(BboxSelector::new(7.5987, 51.9505, 7.6242, 51.9659))
//!         .with_num_results(Some(3));
//!     let tracks = api.get_tracks(&query).await?;
//!     println!("{} measurements", tracks.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Track API: query planning and endpoint paths
pub mod api;
/// Configuration types
pub mod config;
/// Payload decoders
pub mod decode;
/// Concurrent batch downloads
pub mod download;
/// Error types
pub mod error;
/// HTTP transport
pub mod fetcher;
/// Request descriptors and query filters
pub mod request;
/// Tabular results
pub mod table;
/// Core types and events
pub mod types;

#[cfg(test)]
mod test_fixtures;

// Re-export commonly used types
pub use api::{TrackApi, TrackQuery};
pub use config::Config;
pub use decode::{Decoder, TrackDecoder, TrackListDecoder, reduce_track_table};
pub use download::DownloadClient;
pub use error::{Error, Result};
pub use fetcher::{Fetcher, HttpFetcher, Link};
pub use request::{BboxSelector, RequestParam, TimeSelector};
pub use table::{Cell, Table};
pub use types::{DownloadEvent, RawResult, TrackId};
