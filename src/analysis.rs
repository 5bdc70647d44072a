//! The imported coverage dataset, held as an explicit read-only handle.
//!
//! `Analysis::import` reads a coverage file from disk, auto-detects its
//! format, parses it, and normalizes the result: per-module hit lists are
//! sorted ascending by line number, duplicate line records are summed, and
//! repeated records for the same path are merged. Downstream code (resolver,
//! assembler) relies on the sorted order.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{CovpostError, Result};
use crate::model::{CoverageData, LineCoverage};
use crate::parsers::{self, Format};

/// Normalized per-module line coverage, keyed by the recorded source path.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    modules: BTreeMap<String, Vec<LineCoverage>>,
}

impl Analysis {
    /// Read a coverage file, auto-detect its format (or use the override),
    /// and parse it into a normalized store.
    pub fn import(path: &Path) -> Result<Self> {
        Self::import_with_format(path, None)
    }

    pub fn import_with_format(path: &Path, format_override: Option<Format>) -> Result<Self> {
        let content = std::fs::read(path)?;

        let format = match format_override {
            Some(fmt) => fmt,
            None => {
                parsers::detect_format(path, &content).ok_or(CovpostError::UnknownFormat)?
            }
        };

        let data = parsers::parse(format, &content)?;
        Ok(Self::from_data(data))
    }

    /// Normalize parsed coverage data into the keyed store.
    pub fn from_data(data: CoverageData) -> Self {
        let mut modules: BTreeMap<String, BTreeMap<u32, u64>> = BTreeMap::new();

        for file in data.files {
            let counts = modules.entry(file.path).or_default();
            for line in file.lines {
                *counts.entry(line.line_number).or_insert(0) += line.hit_count;
            }
        }

        let modules = modules
            .into_iter()
            .map(|(path, counts)| {
                let lines = counts
                    .into_iter()
                    .map(|(line_number, hit_count)| LineCoverage {
                        line_number,
                        hit_count,
                    })
                    .collect();
                (path, lines)
            })
            .collect();

        Self { modules }
    }

    /// The tracked modules, ascending by recorded source path.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Per-line hit counts for a module, sorted ascending by line number.
    /// `None` if the module is not tracked.
    pub fn line_hits(&self, module: &str) -> Option<&[LineCoverage]> {
        self.modules.get(module).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileCoverage;

    fn raw(path: &str, lines: &[(u32, u64)]) -> FileCoverage {
        FileCoverage {
            path: path.to_string(),
            lines: lines
                .iter()
                .map(|&(line_number, hit_count)| LineCoverage {
                    line_number,
                    hit_count,
                })
                .collect(),
        }
    }

    #[test]
    fn test_from_data_sorts_lines() {
        let data = CoverageData {
            files: vec![raw("src/lib.rs", &[(3, 1), (1, 5), (2, 0)])],
        };
        let analysis = Analysis::from_data(data);

        let hits = analysis.line_hits("src/lib.rs").unwrap();
        let numbers: Vec<u32> = hits.iter().map(|h| h.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_data_sums_duplicate_lines() {
        let data = CoverageData {
            files: vec![raw("src/lib.rs", &[(1, 2), (1, 3)])],
        };
        let analysis = Analysis::from_data(data);

        let hits = analysis.line_hits("src/lib.rs").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].hit_count, 5);
    }

    #[test]
    fn test_from_data_merges_repeated_paths() {
        let data = CoverageData {
            files: vec![
                raw("src/lib.rs", &[(1, 1), (2, 0)]),
                raw("src/lib.rs", &[(2, 4)]),
            ],
        };
        let analysis = Analysis::from_data(data);

        assert_eq!(analysis.len(), 1);
        let hits = analysis.line_hits("src/lib.rs").unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].hit_count, 4);
    }

    #[test]
    fn test_unknown_module() {
        let analysis = Analysis::from_data(CoverageData::new());
        assert!(analysis.line_hits("nope.rs").is_none());
        assert!(analysis.is_empty());
    }
}
