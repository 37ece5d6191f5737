use std::path::Path;
use std::time::Duration;

use crate::data::dataset::RawRow;
use crate::error::{ChartError, Result};

/// Result of reading a tabular file: header names and row-major string cells.
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LoadedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Pair every cell with its column name. Cells beyond the header get a
    /// synthetic name so the dataset validator sees the inconsistency.
    pub fn into_raw_rows(self) -> Vec<RawRow> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let name = columns
                            .get(i)
                            .cloned()
                            .unwrap_or_else(|| format!("column_{i}"));
                        (name, cell)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Load a CSV or Excel file.
pub fn load_file(path: &Path) -> Result<LoadedTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "xls" | "xlsx" => load_excel(path)?,
        _ => return Err(ChartError::UnsupportedFormat(ext)),
    };
    tracing::info!("Read {} rows from {:?}", table.row_count(), path);
    Ok(table)
}

/// Fetch a CSV document over HTTP.
pub fn fetch_csv(url: &str, timeout: Duration) -> Result<LoadedTable> {
    tracing::info!("Fetching dataset from {url}");
    let body = ureq::get(url)
        .timeout(timeout)
        .call()
        .map_err(ChartError::fetch)?
        .into_string()
        .map_err(|e| ChartError::Fetch(format!("unreadable body: {e}")))?;
    parse_csv(&body)
}

fn load_csv(path: &Path) -> Result<LoadedTable> {
    let content = std::fs::read(path)?;
    // Fall back to latin1 (each byte maps to the same code point).
    let text = match String::from_utf8(content) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
    };
    parse_csv(&text)
}

/// Parse CSV text whose first record is the header.
pub fn parse_csv(text: &str) -> Result<LoadedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    if columns.iter().all(|c| c.is_empty()) {
        return Err(ChartError::malformed("no header row found"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(LoadedTable { columns, rows })
}

fn load_excel(path: &Path) -> Result<LoadedTable> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ChartError::Excel(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ChartError::Excel("no sheets found".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ChartError::Excel(e.to_string()))?;

    let mut all_rows = range.rows().map(|row| {
        row.iter()
            .map(|cell| match cell {
                Data::Empty => String::new(),
                Data::String(s) => s.trim().to_string(),
                Data::Float(f) => f.to_string(),
                Data::Int(i) => i.to_string(),
                Data::Bool(b) => b.to_string(),
                Data::DateTime(dt) => dt.to_string(),
                Data::DateTimeIso(s) => s.clone(),
                Data::DurationIso(s) => s.clone(),
                Data::Error(e) => format!("{e:?}"),
            })
            .collect::<Vec<String>>()
    });

    let columns = all_rows
        .next()
        .ok_or_else(|| ChartError::malformed("sheet is empty"))?;
    let rows = all_rows
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    Ok(LoadedTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{Dataset, DEFAULT_IDENTIFIER};
    use std::io::Write;

    const SEASONS_CSV: &str = "model_name,djf,mam,jja,son\n\
        ACCESS1-0,0.512,0.3,0.25,0.4\n\
        CanESM2,1.1,0.9,0.7,0.95\n";

    #[test]
    fn parses_header_and_rows() {
        let table = parse_csv(SEASONS_CSV).unwrap();
        assert_eq!(table.columns, ["model_name", "djf", "mam", "jja", "son"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1][0], "CanESM2");
    }

    #[test]
    fn skips_blank_records_and_trims_cells() {
        let table = parse_csv("model_name, pr\n A , 1.5 \n,\n").unwrap();
        assert_eq!(table.rows, vec![vec!["A".to_string(), "1.5".to_string()]]);
    }

    #[test]
    fn ragged_rows_fail_dataset_validation() {
        let table = parse_csv("model_name,x,y\nA,1,2\nB,3\n").unwrap();
        let err = Dataset::load(table.into_raw_rows(), DEFAULT_IDENTIFIER).unwrap_err();
        assert!(matches!(err, ChartError::MalformedDataset(_)));

        let table = parse_csv("model_name,x\nA,1\nB,3,9\n").unwrap();
        let err = Dataset::load(table.into_raw_rows(), DEFAULT_IDENTIFIER).unwrap_err();
        assert!(matches!(err, ChartError::MalformedDataset(_)));
    }

    #[test]
    fn loads_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SEASONS_CSV.as_bytes()).unwrap();

        let table = load_file(file.path()).unwrap();
        let ds = Dataset::load(table.into_raw_rows(), DEFAULT_IDENTIFIER).unwrap();
        assert_eq!(ds.variables(), ["djf", "mam", "jja", "son"]);
        assert_eq!(ds.row("ACCESS1-0").unwrap().value("djf"), Some(0.512));
    }

    #[test]
    fn latin1_files_still_load() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"model_name,t\xe9mp\nA,1\n").unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns[1], "t\u{e9}mp");
    }

    #[test]
    fn rejects_unknown_extensions() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, ChartError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn unreachable_url_is_a_fetch_failure() {
        let err = fetch_csv("http://127.0.0.1:1/models.csv", Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, ChartError::Fetch(_)), "{err}");
        assert!(!err.to_string().contains("regeneration"));
    }
}
