//! Tabular container for decoded CSV snapshots.

use std::io::Read;

/// A decoded CSV table: header row plus string records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Decode a CSV document. Ragged rows are accepted; short rows read
    /// back as empty cells.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padded or truncated to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell values of a named column; short rows yield empty cells.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Numeric view of a column; unparseable cells become NaN.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let cells = self.column(name)?;
        Some(
            cells
                .into_iter()
                .map(|cell| cell.trim().parse::<f64>().unwrap_or(f64::NAN))
                .collect(),
        )
    }

    /// Left join by row position: every row of `self` survives and
    /// `other`'s columns are appended; missing right-hand rows pad with
    /// empty cells. Clashing headers keep the left name and suffix the
    /// right one with `_y`.
    pub fn merge_by_index(&self, other: &DataTable) -> DataTable {
        let mut headers = self.headers.clone();
        for header in &other.headers {
            if self.headers.contains(header) {
                headers.push(format!("{header}_y"));
            } else {
                headers.push(header.clone());
            }
        }

        let total = headers.len();
        let mut rows = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            let mut merged = row.clone();
            merged.resize(self.headers.len(), String::new());
            if let Some(right) = other.rows.get(i) {
                merged.extend(right.iter().cloned());
            }
            merged.resize(total, String::new());
            rows.push(merged);
        }

        DataTable { headers, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        let mut table = DataTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    #[test]
    fn test_from_reader() {
        let csv = "id,price\n1,100\n2,not-a-number\n3\n";
        let table = DataTable::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(table.headers(), &["id", "price"]);
        assert_eq!(table.len(), 3);

        let prices = table.numeric_column("price").unwrap();
        assert_eq!(prices[0], 100.0);
        assert!(prices[1].is_nan());
        assert!(prices[2].is_nan()); // short row reads as empty cell

        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_merge_by_index_left_join() {
        let master = table(&["id", "price"], &[&["1", "100"], &["2", "250"], &["3", "80"]]);
        let extra = table(&["rooms"], &[&["2"], &["4"]]);

        let merged = master.merge_by_index(&extra);
        assert_eq!(merged.headers(), &["id", "price", "rooms"]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.column("rooms").unwrap(), vec!["2", "4", ""]);
        // the master side is untouched
        assert_eq!(merged.column("price").unwrap(), vec!["100", "250", "80"]);
    }

    #[test]
    fn test_merge_suffixes_clashing_headers() {
        let master = table(&["id", "price"], &[&["1", "100"]]);
        let extra = table(&["price"], &[&["999"]]);

        let merged = master.merge_by_index(&extra);
        assert_eq!(merged.headers(), &["id", "price", "price_y"]);
        assert_eq!(merged.column("price").unwrap(), vec!["100"]);
        assert_eq!(merged.column("price_y").unwrap(), vec!["999"]);
    }

    #[test]
    fn test_merge_ignores_extra_right_rows() {
        let master = table(&["id"], &[&["1"]]);
        let extra = table(&["v"], &[&["a"], &["b"], &["c"]]);

        let merged = master.merge_by_index(&extra);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.column("v").unwrap(), vec!["a"]);
    }
}
