//! Parallel matching of many pairs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;

use super::orchestrator::Matcher;
use crate::error::Result;

/// One scored pair, named in the order it was requested.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistortionEntry {
    /// First mesh of the requested pair
    pub first: String,
    /// Second mesh of the requested pair
    pub second: String,
    /// Geodesic distortion
    pub distortion: f64,
}

/// Distortions laid out as a table: rows are first meshes, columns second
/// meshes, both in first-seen order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DistortionTable {
    rows: Vec<String>,
    columns: Vec<String>,
    entries: Vec<DistortionEntry>,
}

impl DistortionTable {
    /// Build from scored pairs.
    pub fn from_entries(entries: Vec<DistortionEntry>) -> Self {
        let mut rows: Vec<String> = Vec::new();
        let mut columns: Vec<String> = Vec::new();
        for entry in &entries {
            if !rows.contains(&entry.first) {
                rows.push(entry.first.clone());
            }
            if !columns.contains(&entry.second) {
                columns.push(entry.second.clone());
            }
        }
        Self {
            rows,
            columns,
            entries,
        }
    }

    /// Row names.
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Scored pairs in request order.
    pub fn entries(&self) -> &[DistortionEntry] {
        &self.entries
    }

    /// Distortion for `(first, second)`, if that pair was matched.
    pub fn get(&self, first: &str, second: &str) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.first == first && e.second == second)
            .map(|e| e.distortion)
    }

    /// Write as CSV with a header of column names and one line per row.
    /// Unmatched cells are left empty.
    pub fn write_csv(&self, path: &Path) -> std::io::Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        self.write_to(&mut file)?;
        file.flush()
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for column in &self.columns {
            write!(writer, ",{}", column)?;
        }
        writeln!(writer)?;
        for row in &self.rows {
            write!(writer, "{}", row)?;
            for column in &self.columns {
                match self.get(row, column) {
                    Some(d) => write!(writer, ",{}", d)?,
                    None => write!(writer, ",")?,
                }
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

impl Matcher {
    /// Match every pair in parallel and tabulate the distortions.
    ///
    /// Pairs are independent; the first failure is returned with its pair.
    pub fn match_pairs<S: AsRef<str> + Sync>(&self, pairs: &[(S, S)]) -> Result<DistortionTable> {
        let entries = pairs
            .par_iter()
            .map(|(a, b)| -> Result<DistortionEntry> {
                let outcome = self.match_pair(a.as_ref(), b.as_ref())?;
                Ok(DistortionEntry {
                    first: a.as_ref().to_string(),
                    second: b.as_ref().to_string(),
                    distortion: outcome.distortion,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        log::info!("Matched {} pairs", entries.len());
        Ok(DistortionTable::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(first: &str, second: &str, distortion: f64) -> DistortionEntry {
        DistortionEntry {
            first: first.to_string(),
            second: second.to_string(),
            distortion,
        }
    }

    #[test]
    fn test_layout() {
        let table = DistortionTable::from_entries(vec![
            entry("Q01", "Q02", 0.5),
            entry("Q01", "Q03", 0.25),
            entry("Q02", "Q03", 0.125),
        ]);
        assert_eq!(table.rows(), &["Q01", "Q02"]);
        assert_eq!(table.columns(), &["Q02", "Q03"]);
        assert_eq!(table.get("Q01", "Q03"), Some(0.25));
        assert_eq!(table.get("Q02", "Q02"), None);
    }

    #[test]
    fn test_csv() {
        let table = DistortionTable::from_entries(vec![
            entry("a", "b", 0.5),
            entry("c", "d", 0.25),
        ]);
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ",b,d\na,0.5,\nc,,0.25\n");
    }

    #[test]
    fn test_write_csv_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("geodesic_distortions.csv");
        DistortionTable::from_entries(vec![entry("a", "b", 1.0)])
            .write_csv(&path)
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), ",b\na,1\n");
    }
}
