//! Reduced, typed projection of decoded track points

use crate::error::{Error, Result};
use crate::table::{Cell, Table};
use chrono::{DateTime, NaiveDateTime, Utc};

#[derive(Clone, Copy, Debug)]
enum Coercion {
    Numeric,
    DateTime,
    Text,
}

impl Coercion {
    fn name(self) -> &'static str {
        match self {
            Coercion::Numeric => "numeric",
            Coercion::DateTime => "datetime",
            Coercion::Text => "text",
        }
    }
}

/// (source column, reduced column, coercion), in output order
const PROJECTION: [(&str, &str, Coercion); 10] = [
    ("x", "x", Coercion::Numeric),
    ("y", "y", Coercion::Numeric),
    ("time", "time", Coercion::DateTime),
    ("Speed.value", "speed_value", Coercion::Numeric),
    ("GPS Accuracy.value", "gps_accuracy_value", Coercion::Numeric),
    ("GPS Speed.value", "gps_speed_value", Coercion::Numeric),
    ("track.begin", "track_begin", Coercion::DateTime),
    ("track.end", "track_end", Coercion::DateTime),
    ("track.length", "track_length", Coercion::Numeric),
    ("track.id", "track_id", Coercion::Text),
];

/// Column names of a fully populated reduced table, in order
pub const REDUCED_COLUMNS: [&str; 10] = [
    "x",
    "y",
    "time",
    "speed_value",
    "gps_accuracy_value",
    "gps_speed_value",
    "track_begin",
    "track_end",
    "track_length",
    "track_id",
];

/// Project a decoded track table onto the canonical reduced columns
///
/// Source columns missing from `table` are skipped without error, so the
/// result holds a subset of [`REDUCED_COLUMNS`] in canonical order.
/// Coordinates, speeds, accuracy and length become numbers, `time` and the
/// track bounds become timestamps, and the track id becomes text.
///
/// # Errors
/// Returns [`Error::Coercion`] when a present value cannot be converted.
pub fn reduce_track_table(table: &Table) -> Result<Table> {
    let sources: Vec<&str> = PROJECTION.iter().map(|(source, _, _)| *source).collect();
    let mut reduced = table.select(&sources);

    for (source, target, coercion) in PROJECTION {
        reduced.map_column(source, |cell| coerce(source, cell, coercion))?;
        reduced.rename_column(source, target);
    }
    Ok(reduced)
}

fn coerce(column: &str, cell: &Cell, coercion: Coercion) -> Result<Cell> {
    let converted = match (coercion, cell) {
        (_, Cell::Null) => Some(Cell::Null),

        (Coercion::Numeric, Cell::Int(_) | Cell::Float(_)) => Some(cell.clone()),
        (Coercion::Numeric, Cell::Bool(b)) => Some(Cell::Int(i64::from(*b))),
        (Coercion::Numeric, Cell::Text(s)) => parse_number(s),

        (Coercion::DateTime, Cell::Timestamp(_)) => Some(cell.clone()),
        (Coercion::DateTime, Cell::Text(s)) => parse_datetime(s).map(Cell::Timestamp),

        (Coercion::Text, Cell::Text(_)) => Some(cell.clone()),
        (Coercion::Text, other) => Some(Cell::Text(other.to_string())),

        _ => None,
    };

    converted.ok_or_else(|| Error::Coercion {
        column: column.to_string(),
        value: match cell {
            Cell::Text(s) => format!("{s:?}"),
            other => format!("{other} ({})", other.type_name()),
        },
        expected: coercion.name(),
    })
}

fn parse_number(s: &str) -> Option<Cell> {
    let s = s.trim();
    if s.is_empty() {
        return Some(Cell::Null);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Cell::Int(i));
    }
    s.parse::<f64>().ok().map(Cell::Float)
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Timestamps without offset are taken as UTC
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
