//! Cleaned restaurant dataset backing the Analysis page.

use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => AppError::Io(e),
        })?;

        let dataset = Self::from_reader(BufReader::new(file))?;
        log::debug!(
            "Loaded dataset {}: {} rows, {} columns",
            path.display(),
            dataset.len(),
            dataset.headers.len()
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(String::from).collect();
        let rows = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Fails with every absent column, not only the first one.
    pub fn require_columns(&self, columns: &[&str]) -> Result<()> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|column| !self.has_column(column))
            .map(|column| column.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingColumns { columns: missing })
        }
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AppError::MissingColumns {
                columns: vec![name.to_string()],
            })
    }

    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let ix = self.index_of(name)?;
        Ok(self.rows.iter().map(|row| row.get(ix).unwrap_or("")).collect())
    }

    /// Parsed values of a numeric column; empty cells are skipped.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        self.numeric_cells(name)
            .map(|cells| cells.into_iter().flatten().collect())
    }

    /// Parsed values aligned with rows, `None` for empty cells.
    pub fn numeric_cells(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let ix = self.index_of(name)?;
        self.rows
            .iter()
            .map(|row| {
                let cell = row.get(ix).unwrap_or("");
                if cell.is_empty() {
                    return Ok(None);
                }
                cell.parse::<f64>().map(Some).map_err(|_| AppError::NonNumeric {
                    column: name.to_string(),
                    line: row.position().map(|p| p.line()).unwrap_or(0),
                    value: cell.to_string(),
                })
            })
            .collect()
    }

    /// True when every non-empty cell parses as a number.
    pub fn is_numeric(&self, name: &str) -> bool {
        match self.column(name) {
            Ok(cells) => {
                let mut seen = false;
                for cell in cells.into_iter().filter(|c| !c.is_empty()) {
                    if cell.parse::<f64>().is_err() {
                        return false;
                    }
                    seen = true;
                }
                seen
            }
            Err(_) => false,
        }
    }

    pub fn head(&self, n: usize) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .take(n)
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().map(String::from))
                    .collect()
            })
            .collect()
    }
}
