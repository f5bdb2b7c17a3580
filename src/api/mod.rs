//! Typed access to the enviroCar REST endpoints
//!
//! [`TrackApi`] is the entry point: it turns track queries into batches of
//! [`RequestParam`](crate::request::RequestParam)s and decodes the answers
//! into [`Table`](crate::table::Table)s.

mod endpoints;
mod tracks;

pub use endpoints::Endpoints;
pub use tracks::{TRACK_ID_COLUMN, TrackApi, TrackQuery};
