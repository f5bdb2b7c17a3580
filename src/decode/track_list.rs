//! Decoder for paged track listings (`GET tracks`, `GET users/{name}/tracks`)

use super::{Decoder, track_column_name};
use crate::error::{Error, Result};
use crate::table::{Table, flatten_object};
use crate::table::flatten::rename_keys;
use crate::types::RawResult;
use serde_json::Value;
use tracing::debug;

/// Key of the track array in a listing page
const TRACKS_KEY: &str = "tracks";

/// Turns listing pages into one row per track summary
///
/// Every track object is flattened into dotted columns and namespaced with
/// `track.` (sensor columns excepted), so a track's id lands in `track.id`.
/// Pages are concatenated in order without de-duplication.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackListDecoder;

impl TrackListDecoder {
    /// Decode a single listing page
    pub fn decode_page(&self, body: &str) -> Result<Table> {
        let page: Value = serde_json::from_str(body)?;
        let tracks = page
            .get(TRACKS_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Decode(format!("listing page has no '{TRACKS_KEY}' array")))?;

        let mut table = Table::new();
        for track in tracks {
            let object = track
                .as_object()
                .ok_or_else(|| Error::Decode(format!("track entry is not an object: {track}")))?;
            table.push_record(rename_keys(flatten_object(object), track_column_name));
        }
        Ok(table)
    }
}

impl Decoder for TrackListDecoder {
    fn decode(&self, bodies: &[RawResult], _post_process: bool) -> Result<Table> {
        let mut tracks = Table::new();
        for body in bodies.iter().flatten() {
            if body.trim().is_empty() {
                continue;
            }
            tracks.append(self.decode_page(body)?);
        }
        debug!(
            pages = bodies.len(),
            tracks = tracks.len(),
            "Decoded track listing"
        );
        Ok(tracks)
    }
}
