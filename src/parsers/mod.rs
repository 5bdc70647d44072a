//! Input format detection and parsing.
//!
//! Strategy:
//!   1. Check file extension for strong hints
//!   2. Peek at the first bytes of the file content
//!   3. Fall back to a caller-supplied format override

pub mod cobertura;
pub mod lcov;

use std::path::Path;

use crate::error::{CovpostError, Result};
use crate::model::CoverageData;

/// Every format parser implements this trait.
pub trait Parser {
    /// Parse the input bytes into our uniform coverage model.
    fn parse(&self, input: &[u8]) -> Result<CoverageData>;
}

/// Supported coverage input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Cobertura,
    Lcov,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Cobertura => "cobertura",
            Format::Lcov => "lcov",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = CovpostError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cobertura" => Ok(Format::Cobertura),
            "lcov" => Ok(Format::Lcov),
            _ => Err(CovpostError::Parse(format!(
                "Unknown format: '{}'. Supported: cobertura, lcov",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse with a specific format.
pub fn parse(format: Format, input: &[u8]) -> Result<CoverageData> {
    match format {
        Format::Cobertura => cobertura::CoberturaParser.parse(input),
        Format::Lcov => lcov::LcovParser.parse(input),
    }
}

/// Detect the coverage format from filename and file content.
pub fn detect_format(path: &Path, content: &[u8]) -> Option<Format> {
    if let Some(fmt) = detect_by_extension(path) {
        return Some(fmt);
    }
    detect_by_content(content)
}

fn detect_by_extension(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "info" | "lcov" => Some(Format::Lcov),
        // .xml needs content inspection
        _ => None,
    }
}

fn detect_by_content(content: &[u8]) -> Option<Format> {
    // The first few KB are enough to tell the formats apart
    let head_len = content.len().min(4096);
    let head = String::from_utf8_lossy(&content[..head_len]);

    // LCOV: lines start with SF:, DA:, etc. Check that lines actually start
    // with these tags to avoid false positives on files that merely contain
    // these strings.
    let has_sf = head.lines().any(|l| l.starts_with("SF:"));
    let has_da = head.lines().any(|l| l.starts_with("DA:"));
    if has_sf && has_da {
        return Some(Format::Lcov);
    }

    if head.contains("<?xml") || head.trim_start().starts_with('<') {
        if head.contains("<coverage") {
            return Some(Format::Cobertura);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_lcov_by_extension() {
        let path = Path::new("coverage.info");
        assert_eq!(detect_format(path, b""), Some(Format::Lcov));

        let path = Path::new("coverage.lcov");
        assert_eq!(detect_format(path, b""), Some(Format::Lcov));
    }

    #[test]
    fn test_detect_lcov_by_content() {
        let content = b"TN:test\nSF:/src/lib.rs\nDA:1,5\nend_of_record\n";
        let path = Path::new("coverage.txt");
        assert_eq!(detect_format(path, content), Some(Format::Lcov));
    }

    #[test]
    fn test_detect_cobertura_by_content() {
        let content = b"<?xml version=\"1.0\"?>\n<coverage version=\"1.0\">";
        let path = Path::new("coverage.xml");
        assert_eq!(detect_format(path, content), Some(Format::Cobertura));
    }

    #[test]
    fn test_detect_unknown() {
        let path = Path::new("random.dat");
        assert_eq!(detect_format(path, b"hello world"), None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("lcov".parse::<Format>().unwrap(), Format::Lcov);
        assert_eq!("Cobertura".parse::<Format>().unwrap(), Format::Cobertura);
        assert!("jacoco".parse::<Format>().is_err());
    }
}
