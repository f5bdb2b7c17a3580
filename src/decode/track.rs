//! Decoder for single-track GeoJSON documents (`GET tracks/{id}`)
//!
//! A track document is a FeatureCollection whose top-level `properties` hold
//! the track and sensor (vehicle) metadata, and whose Point features carry one
//! measurement each:
//!
//! ```json
//! {
//!   "type": "FeatureCollection",
//!   "properties": {"id": "...", "length": 3.2, "sensor": {"type": "car", "properties": {...}}},
//!   "features": [
//!     {"type": "Feature",
//!      "geometry": {"type": "Point", "coordinates": [7.61, 51.95]},
//!      "properties": {"id": "...", "time": "...", "phenomenons": {"Speed": {"value": 31.0, "unit": "km/h"}}}}
//!   ]
//! }
//! ```
//!
//! Decoding yields one row per feature. The metadata is broadcast onto every
//! row, so each row is self-contained.

use super::{Decoder, reduce_track_table, track_column_name};
use crate::error::{Error, Result};
use crate::table::flatten::rename_keys;
use crate::table::{Cell, Record, Table, flatten_object};
use crate::types::RawResult;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Feature property holding the per-point measurements
const PHENOMENONS_KEY: &str = "phenomenons";

#[derive(Debug, Deserialize)]
struct TrackDocument {
    properties: Map<String, Value>,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Turns track documents into one row per measurement point
///
/// Columns, in order: `y`, `x`, the feature properties (`id`, `time`, ...),
/// one `<phenomenon>.<field>` column per measured value (e.g. `Speed.value`,
/// `Speed.unit`), then the broadcast metadata (`track.*`, `sensor.*`). With
/// `post_process` the result is reduced by [`reduce_track_table`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackDecoder;

impl TrackDecoder {
    /// Decode a single track document into its point rows
    pub fn decode_track(&self, body: &str) -> Result<Table> {
        let document: TrackDocument = serde_json::from_str(body)?;

        let metadata = track_metadata(&document.properties);
        let track_id = metadata
            .iter()
            .find(|(k, _)| k == "track.id")
            .map(|(_, v)| v.to_string())
            .unwrap_or_default();

        let mut points = Table::new();
        for (index, feature) in document.features.iter().enumerate() {
            points.push_record(point_record(feature).map_err(|reason| {
                Error::Decode(format!("track {track_id}, feature {index}: {reason}"))
            })?);
        }

        points.broadcast_join(&metadata).map_err(|column| {
            Error::Decode(format!(
                "track {track_id}: column '{column}' present in both point and track data"
            ))
        })?;

        debug!(track_id = %track_id, points = points.len(), "Decoded track");
        Ok(points)
    }
}

impl Decoder for TrackDecoder {
    fn decode(&self, bodies: &[RawResult], post_process: bool) -> Result<Table> {
        let mut tracks = Table::new();
        for body in bodies.iter().flatten() {
            let mut track = self.decode_track(body)?;
            if post_process {
                track = reduce_track_table(&track)?;
            }
            tracks.append(track);
        }
        Ok(tracks)
    }
}

/// Flatten the document-level properties into the broadcast metadata record
fn track_metadata(properties: &Map<String, Value>) -> Record {
    rename_keys(flatten_object(properties), |key| {
        track_column_name(&key.replace("sensor.properties.", "sensor."))
    })
}

/// Build one point row: coordinates, feature properties, phenomenon values
fn point_record(feature: &Feature) -> std::result::Result<Record, String> {
    let (x, y) = match &feature.geometry {
        None => (Cell::Null, Cell::Null),
        Some(geometry) if geometry.kind == "Point" => point_coordinates(&geometry.coordinates)?,
        Some(geometry) => return Err(format!("expected Point geometry, got {}", geometry.kind)),
    };

    let mut record: Record = vec![("y".to_string(), y), ("x".to_string(), x)];

    if let Some(properties) = &feature.properties {
        let mut scalars = properties.clone();
        let phenomenons = scalars.remove(PHENOMENONS_KEY);
        record.extend(flatten_object(&scalars));

        match phenomenons {
            Some(Value::Object(values)) => record.extend(flatten_object(&values)),
            None | Some(Value::Null) => {}
            Some(other) => return Err(format!("'{PHENOMENONS_KEY}' is not an object: {other}")),
        }
    }

    Ok(record)
}

fn point_coordinates(coordinates: &Value) -> std::result::Result<(Cell, Cell), String> {
    let pair = coordinates
        .as_array()
        .filter(|c| c.len() >= 2)
        .ok_or_else(|| format!("invalid Point coordinates: {coordinates}"))?;
    match (pair[0].as_f64(), pair[1].as_f64()) {
        (Some(x), Some(y)) => Ok((Cell::Float(x), Cell::Float(y))),
        _ => Err(format!("non-numeric Point coordinates: {coordinates}")),
    }
}
