//! Decoders turning raw batch results into tables
//!
//! A [`Decoder`] is handed the complete, order-aligned result list of a batch
//! exactly once, which lets it concatenate multi-page results in one pass.

mod reduce;
mod track;
mod track_list;

pub use reduce::{REDUCED_COLUMNS, reduce_track_table};
pub use track::TrackDecoder;
pub use track_list::TrackListDecoder;

use crate::error::Result;
use crate::table::Table;
use crate::types::RawResult;

/// Strategy for decoding the bodies of one batch
///
/// Absent entries (`None`) are failed fetches and must be skipped, not
/// reported as errors. Malformed bodies, on the other hand, are errors.
pub trait Decoder: Send + Sync {
    /// Decode all bodies of a batch into one table
    ///
    /// `post_process` asks the decoder for its reduced, typed projection when
    /// it has one; decoders without such a projection ignore it.
    fn decode(&self, bodies: &[RawResult], post_process: bool) -> Result<Table>;
}

impl<F> Decoder for F
where
    F: Fn(&[RawResult], bool) -> Result<Table> + Send + Sync,
{
    fn decode(&self, bodies: &[RawResult], post_process: bool) -> Result<Table> {
        self(bodies, post_process)
    }
}

/// Rename rule shared by both track decoders
///
/// Sensor columns keep their name, everything else is namespaced under
/// `track.`.
pub(crate) fn track_column_name(name: &str) -> String {
    if name.starts_with("sensor") {
        name.to_string()
    } else {
        format!("track.{name}")
    }
}
