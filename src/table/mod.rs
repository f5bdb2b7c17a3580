//! Column-oriented result tables
//!
//! Decoders produce a [`Table`]: an ordered list of column names plus rows of
//! [`Cell`]s. Tables from different pages or tracks rarely share exactly the
//! same columns, so [`Table::append`] takes the union of columns (first-seen
//! order) and fills the gaps with [`Cell::Null`].

mod cell;
pub mod flatten;

pub use cell::Cell;
pub use flatten::{Record, flatten_object};

use crate::error::Result;
use std::collections::HashMap;

/// Tabular result of a decode step
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Empty table without columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with the given columns
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for column in columns {
            table.ensure_column(&column.into());
        }
        table
    }

    /// Build a table from records, taking the union of their keys
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut table = Self::new();
        for record in records {
            table.push_record(record);
        }
        table
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a column with this name exists
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Cell at (`row`, `column`), `None` if either is out of range
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = *self.index.get(column)?;
        self.rows.get(row)?.get(col)
    }

    /// All cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let col = *self.index.get(name)?;
        Some(self.rows.iter().map(move |row| &row[col]))
    }

    /// Iterate over rows as `(column, cell)` pairs
    pub fn rows(&self) -> impl Iterator<Item = Vec<(&str, &Cell)>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .map(String::as_str)
                .zip(row.iter())
                .collect()
        })
    }

    /// Distinct values of a column in first-seen order (nulls excluded)
    pub fn unique(&self, name: &str) -> Vec<Cell> {
        let mut seen = Vec::new();
        if let Some(cells) = self.column(name) {
            for cell in cells {
                if !cell.is_null() && !seen.contains(cell) {
                    seen.push(cell.clone());
                }
            }
        }
        seen
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(&col) = self.index.get(name) {
            return col;
        }
        let col = self.columns.len();
        self.columns.push(name.to_string());
        self.index.insert(name.to_string(), col);
        for row in &mut self.rows {
            row.push(Cell::Null);
        }
        col
    }

    /// Append one record, adding any new columns
    ///
    /// A key repeated within the record keeps its last value.
    pub fn push_record(&mut self, record: Record) {
        let cols: Vec<usize> = record.iter().map(|(k, _)| self.ensure_column(k)).collect();
        let mut row = vec![Cell::Null; self.columns.len()];
        for (col, (_, cell)) in cols.into_iter().zip(record) {
            row[col] = cell;
        }
        self.rows.push(row);
    }

    /// Concatenate `other` below `self` (union of columns, null fill)
    pub fn append(&mut self, other: Table) {
        let Table { columns, rows, .. } = other;
        let mapping: Vec<usize> = columns.iter().map(|c| self.ensure_column(c)).collect();
        let width = self.columns.len();
        self.rows.reserve(rows.len());
        for row in rows {
            let mut out = vec![Cell::Null; width];
            for (cell, &col) in row.into_iter().zip(&mapping) {
                out[col] = cell;
            }
            self.rows.push(out);
        }
    }

    /// Add `record`'s columns to every row (broadcast join)
    ///
    /// Returns the name of the first colliding column instead of joining when
    /// `record` shares a column with `self`.
    pub fn broadcast_join(&mut self, record: &Record) -> std::result::Result<(), String> {
        if let Some((name, _)) = record.iter().find(|(k, _)| self.has_column(k)) {
            return Err(name.clone());
        }
        for (name, cell) in record {
            let col = self.ensure_column(name);
            for row in &mut self.rows {
                row[col] = cell.clone();
            }
        }
        Ok(())
    }

    /// Rename one column; no-op when it does not exist
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(col) = self.index.remove(from) {
            self.columns[col] = to.to_string();
            self.index.insert(to.to_string(), col);
        }
    }

    /// Project onto `names`, in that order, silently skipping missing columns
    pub fn select(&self, names: &[&str]) -> Table {
        let picked: Vec<(&str, usize)> = names
            .iter()
            .filter_map(|n| self.index.get(*n).map(|&c| (*n, c)))
            .collect();

        let mut out = Table::with_columns(picked.iter().map(|(n, _)| *n));
        out.rows = self
            .rows
            .iter()
            .map(|row| picked.iter().map(|&(_, c)| row[c].clone()).collect())
            .collect();
        out
    }

    /// Replace every cell of a column with `f(cell)`
    ///
    /// Stops at the first error. Missing columns are a no-op.
    pub fn map_column(&mut self, name: &str, f: impl Fn(&Cell) -> Result<Cell>) -> Result<()> {
        let Some(&col) = self.index.get(name) else {
            return Ok(());
        };
        for row in &mut self.rows {
            row[col] = f(&row[col])?;
        }
        Ok(())
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pairs: &[(&str, Cell)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn append_takes_column_union_with_null_fill() {
        let mut a = Table::from_records([rec(&[("id", Cell::from("a")), ("length", Cell::Float(1.5))])]);
        let b = Table::from_records([rec(&[("id", Cell::from("b")), ("fuel", Cell::from("diesel"))])]);
        a.append(b);

        assert_eq!(a.columns(), &["id", "length", "fuel"]);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get(0, "fuel"), Some(&Cell::Null));
        assert_eq!(a.get(1, "length"), Some(&Cell::Null));
        assert_eq!(a.get(1, "id"), Some(&Cell::from("b")));
    }

    #[test]
    fn broadcast_join_replicates_record_and_rejects_collisions() {
        let mut points = Table::from_records([
            rec(&[("x", Cell::Float(7.1))]),
            rec(&[("x", Cell::Float(7.2))]),
        ]);
        points
            .broadcast_join(&rec(&[("track.id", Cell::from("t1"))]))
            .unwrap();
        assert_eq!(points.get(0, "track.id"), Some(&Cell::from("t1")));
        assert_eq!(points.get(1, "track.id"), Some(&Cell::from("t1")));

        let err = points.broadcast_join(&rec(&[("x", Cell::Int(1))])).unwrap_err();
        assert_eq!(err, "x");
    }

    #[test]
    fn select_skips_missing_columns_and_orders_by_request() {
        let table = Table::from_records([rec(&[("a", Cell::Int(1)), ("b", Cell::Int(2))])]);
        let projected = table.select(&["b", "missing", "a"]);
        assert_eq!(projected.columns(), &["b", "a"]);
        assert_eq!(projected.get(0, "b"), Some(&Cell::Int(2)));
    }

    #[test]
    fn map_and_rename_column() {
        let mut table = Table::from_records([rec(&[("v", Cell::from("3.5")), ("w", Cell::Int(1))])]);
        table
            .map_column("v", |c| Ok(Cell::Float(c.as_str().unwrap().parse().unwrap())))
            .unwrap();
        table.rename_column("v", "v_num");
        assert_eq!(table.columns(), &["v_num", "w"]);
        assert_eq!(table.get(0, "v_num"), Some(&Cell::Float(3.5)));
        // missing columns are ignored
        table.map_column("nope", |_| Ok(Cell::Null)).unwrap();
        table.rename_column("nope", "other");
        assert!(!table.has_column("other"));
    }
}
