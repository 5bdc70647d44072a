//! The Coveralls payload: per-file records, line-array alignment, and the
//! top-level report builder.

use serde::Serialize;

use crate::analysis::Analysis;
use crate::error::Result;
use crate::model::LineCoverage;
use crate::options::Options;
use crate::resolve::Resolver;

/// One file entry in the payload.
///
/// Invariant: `coverage.len()` equals the number of line-feed-delimited
/// segments of `source`, one entry per source line. `None` marks a line
/// with no runtime record (blank, comment, declaration), distinct from
/// `Some(0)` (executable but never hit).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    pub coverage: Vec<Option<u64>>,
}

/// The top-level payload. Absent job metadata serializes as `null`, never
/// omitted.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub service_job_id: Option<String>,
    pub service_name: Option<String>,
    pub source_files: Vec<SourceFile>,
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Expand raw hit records into a fixed-length per-line array.
///
/// Walks lines `1..=total_lines` against `hits` with a merge-join cursor;
/// `hits` must be sorted ascending by line number (the [`Analysis`] store
/// guarantees this). Line number 0 is a module summary record and is
/// discarded regardless of its value or position. Lines with no matching
/// record, and all lines past the end of `hits`, come out as `None`.
pub fn align(total_lines: usize, hits: &[LineCoverage]) -> Vec<Option<u64>> {
    let mut cursor = hits.iter().filter(|h| h.line_number != 0).peekable();
    let mut coverage = Vec::with_capacity(total_lines);

    for line_number in 1..=total_lines as u32 {
        match cursor.peek() {
            Some(hit) if hit.line_number == line_number => {
                coverage.push(Some(hit.hit_count));
                cursor.next();
            }
            _ => coverage.push(None),
        }
    }

    coverage
}

/// Build the payload record for one module: resolve its source file, read
/// it, and align the module's hits to its lines.
///
/// Any failure here (unresolvable module, vanished file) is a signal to
/// skip the file, not to abort the run.
pub fn assemble(analysis: &Analysis, resolver: &Resolver, module: &str) -> Result<SourceFile> {
    let resolved = resolver.resolve(analysis, module)?;

    let bytes = std::fs::read(&resolved.path)?;
    let source = String::from_utf8_lossy(&bytes).into_owned();

    // One entry per line-feed-delimited segment; a trailing newline yields
    // a final empty segment that still gets an entry.
    let total_lines = source.split('\n').count();

    let hits = analysis.line_hits(module).unwrap_or(&[]);
    let coverage = align(total_lines, hits);

    Ok(SourceFile {
        name: resolved.name,
        source,
        coverage,
    })
}

/// Assemble every tracked module into the top-level payload. Modules that
/// fail assembly are omitted; partial reports are expected, since the build
/// may have stripped source info from some modules.
pub fn build_report(analysis: &Analysis, resolver: &Resolver, options: &Options) -> Report {
    let mut source_files = Vec::new();

    for module in analysis.modules() {
        match assemble(analysis, resolver, module) {
            Ok(file) => source_files.push(file),
            Err(crate::error::CovpostError::SourceNotFound(_)) => {}
            Err(err) => {
                eprintln!("Warning: skipping '{}': {}", module, err);
            }
        }
    }

    Report {
        service_job_id: options.service_job_id.clone(),
        service_name: options.service_name.clone(),
        source_files,
    }
}
