// src/transform.rs

use serde_json::{Map, Value};

/// Rows of cell text as returned by the values API; row 0 is the header.
pub type CellGrid = Vec<Vec<String>>;

/// One data row keyed by header. Keys keep header order.
pub type Record = Map<String, Value>;

/// Header row plus the records built from every row after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turn a grid into header-keyed records.
///
/// Short rows are padded with `""`, cells past the header width are dropped,
/// and a repeated header keeps its first position but takes the later value.
pub fn grid_to_table(grid: CellGrid) -> Table {
    let mut rows = grid.into_iter();
    let Some(headers) = rows.next() else {
        return Table::default();
    };

    let records = rows.map(|row| row_to_record(&headers, row)).collect();
    Table { headers, records }
}

fn row_to_record(headers: &[String], row: Vec<String>) -> Record {
    let mut cells = row.into_iter();
    let mut record = Map::with_capacity(headers.len());
    for header in headers {
        let value = cells.next().unwrap_or_default();
        record.insert(header.clone(), Value::String(value));
    }
    record
}
