/// Parser for the LCOV `.info` format.
///
/// Reference: https://ltp.sourceforge.net/coverage/lcov/geninfo.1.php
///
/// Records we consume:
///   SF:<path to source file>
///   DA:<line number>,<execution count>[,<checksum>]
///   end_of_record
///
/// Function (FN/FNDA) and branch (BRDA) records are skipped: the Coveralls
/// line array carries execution counts only.
use crate::error::{CovpostError, Result};
use crate::model::{CoverageData, FileCoverage, LineCoverage};
use crate::parsers::Parser;

pub struct LcovParser;

impl Parser for LcovParser {
    fn parse(&self, input: &[u8]) -> Result<CoverageData> {
        parse_lcov(input)
    }
}

fn parse_lcov(input: &[u8]) -> Result<CoverageData> {
    let text = std::str::from_utf8(input)
        .map_err(|_| CovpostError::Parse("Invalid UTF-8 in LCOV data".to_string()))?;

    let mut data = CoverageData::new();
    let mut current: Option<FileCoverage> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line == "end_of_record" {
            if let Some(file) = current.take() {
                data.files.push(file);
            }
            continue;
        }

        let Some((tag, value)) = line.split_once(':') else {
            // Skip lines we don't understand
            continue;
        };

        match tag {
            "SF" => current = Some(FileCoverage::new(value.to_string())),
            "DA" => {
                if let Some(file) = current.as_mut() {
                    if let Some(hit) = parse_da(value) {
                        file.lines.push(hit);
                    }
                }
            }
            // TN, FN, FNDA, BRDA, LF, LH, FNF, FNH, BRF, BRH — ignored
            _ => {}
        }
    }

    // Input may end without a final end_of_record.
    if let Some(file) = current.take() {
        data.files.push(file);
    }

    Ok(data)
}

/// Parse one `DA:<line_number>,<execution_count>[,<checksum>]` value.
///
/// Some instrumenters use negative counts (e.g. -1) to mark lines that could
/// not be instrumented; those records are dropped.
fn parse_da(value: &str) -> Option<LineCoverage> {
    let (line_str, rest) = value.split_once(',')?;
    let count_str = rest.split(',').next()?;

    let line_number: u32 = line_str.parse().ok()?;
    let count: i64 = count_str.parse().ok()?;
    if count < 0 {
        return None;
    }

    Some(LineCoverage {
        line_number,
        hit_count: count as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lcov() {
        let input = include_bytes!("../../tests/fixtures/sample.lcov");
        let data = parse_lcov(input).unwrap();

        assert_eq!(data.files.len(), 2);

        let lib = &data.files[0];
        assert_eq!(lib.path, "/src/lib.rs");
        assert_eq!(lib.lines.len(), 3);
        assert_eq!(lib.lines[0].line_number, 1);
        assert_eq!(lib.lines[0].hit_count, 5);
        assert_eq!(lib.lines[2].line_number, 4);
        assert_eq!(lib.lines[2].hit_count, 0);

        let util = &data.files[1];
        assert_eq!(util.path, "/src/util.rs");
        assert_eq!(util.lines.len(), 2);
    }

    #[test]
    fn test_parse_lcov_no_end_of_record() {
        let input = b"SF:/src/lib.rs\nDA:1,3\nDA:2,0\n";
        let data = parse_lcov(input).unwrap();
        assert_eq!(data.files.len(), 1);
        assert_eq!(data.files[0].lines.len(), 2);
    }

    #[test]
    fn test_parse_lcov_negative_counts() {
        let input = b"SF:/src/lib.rs\nDA:1,5\nDA:2,-1\nDA:3,0\nend_of_record\n";
        let data = parse_lcov(input).unwrap();

        assert_eq!(data.files.len(), 1);
        let file = &data.files[0];
        // Line 2 has count=-1, skipped. Lines 1 and 3 remain.
        assert_eq!(file.lines.len(), 2);
        assert_eq!(file.lines[0].line_number, 1);
        assert_eq!(file.lines[1].line_number, 3);
    }

    #[test]
    fn test_parse_da_with_checksum() {
        let hit = parse_da("12,7,abc123").unwrap();
        assert_eq!(hit.line_number, 12);
        assert_eq!(hit.hit_count, 7);

        assert!(parse_da("garbage").is_none());
        assert!(parse_da("1,notanumber").is_none());
    }

    #[test]
    fn test_parse_lcov_skips_function_and_branch_records() {
        let input = b"SF:/src/lib.rs\nFN:1,main\nFNDA:5,main\nDA:1,5\nBRDA:1,0,0,3\nend_of_record\n";
        let data = parse_lcov(input).unwrap();
        assert_eq!(data.files[0].lines.len(), 1);
    }

    #[test]
    fn test_parse_lcov_empty() {
        // A test name and no records yields no files.
        let data = parse_lcov(b"TN:test\n").unwrap();
        assert_eq!(data.files.len(), 0);
    }
}
