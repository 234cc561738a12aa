// src/extractors/table.rs
use crate::utils::error::TableError;
use csv::ReaderBuilder;
use serde::Serialize;

/// Raw header line plus data lines, exactly as sliced out of a document.
/// Column typing is left to [`TableBlock::to_table`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableBlock {
    pub header: String,
    pub rows: Vec<String>,
}

impl TableBlock {
    pub fn new(header: impl Into<String>, rows: Vec<String>) -> Self {
        Self { header: header.into(), rows }
    }

    /// Header and rows joined back into CSV text.
    pub fn to_csv_string(&self) -> String {
        let mut out = String::with_capacity(
            self.header.len() + self.rows.iter().map(|r| r.len() + 1).sum::<usize>(),
        );
        out.push_str(&self.header);
        for row in &self.rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    /// Reads the block as a CSV table. Quoted fields are honoured, blank
    /// lines skipped, and any record whose width differs from the header
    /// is a `MalformedRow`.
    pub fn to_table(&self) -> Result<Table, TableError> {
        let text = self.to_csv_string();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(text.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(map_csv_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::with_capacity(self.rows.len());
        for result in reader.records() {
            let record = result.map_err(map_csv_error)?;
            records.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!("Parsed table with {} columns and {} records", columns.len(), records.len());
        Ok(Table { columns, records })
    }
}

fn map_csv_error(err: csv::Error) -> TableError {
    match err.kind() {
        csv::ErrorKind::UnequalLengths { pos, expected_len, len } => {
            // The header is record 0, so the record index is the data-row number.
            let row = pos.as_ref().map(|p| p.record() as usize).unwrap_or(0);
            tracing::warn!("Data row {} has {} fields, header has {}", row, len, expected_len);
            TableError::MalformedRow {
                row,
                expected: *expected_len as usize,
                found: *len as usize,
            }
        }
        _ => TableError::Csv(err.to_string()),
    }
}

/// A parsed header + records table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.records.iter().map(|r| r[idx].as_str()).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.records.get(row).map(|r| r[idx].as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(header: &str, rows: &[&str]) -> TableBlock {
        TableBlock::new(header, rows.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn test_to_table_reads_columns_and_records() {
        let table = block("Quarter,Play", &["2,Pass Reception", "3,Rush"]).to_table().unwrap();
        assert_eq!(table.columns, vec!["Quarter", "Play"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("Play"), Some(vec!["Pass Reception", "Rush"]));
        assert_eq!(table.get(1, "Quarter"), Some("3"));
        assert_eq!(table.get(5, "Quarter"), None);
        assert_eq!(table.column("Yards"), None);
    }

    #[test]
    fn test_quoted_fields_keep_commas() {
        let table = block("Quarter,Description", &["1,\"Pass short left, incomplete\""])
            .to_table()
            .unwrap();
        assert_eq!(table.get(0, "Description"), Some("Pass short left, incomplete"));
    }

    #[test]
    fn test_trailing_blank_rows_are_skipped() {
        let table = block("Q,P", &["1,Run", "", ""]).to_table().unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_malformed_row_is_reported() {
        let err = block("Q,P", &["1,Run", "2,Pass,Extra"]).to_table().unwrap_err();
        assert!(
            matches!(err, TableError::MalformedRow { row: 2, expected: 2, found: 3 }),
            "unexpected error: {:?}",
            err
        );
    }

    #[test]
    fn test_malformed_row_number_ignores_blank_lines() {
        let err = block("Q,P", &["", "1,Run", "2"]).to_table().unwrap_err();
        assert!(
            matches!(err, TableError::MalformedRow { row: 2, expected: 2, found: 1 }),
            "unexpected error: {:?}",
            err
        );
    }

    #[test]
    fn test_csv_string_round_trip_text() {
        let b = block("A,B", &["1,2", "3,4"]);
        assert_eq!(b.to_csv_string(), "A,B\n1,2\n3,4");
    }
}
