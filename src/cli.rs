//! Command handler functions for the covpost CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::analysis::Analysis;
use crate::ci;
use crate::options::Options;
use crate::parsers::Format;
use crate::report;
use crate::resolve::Resolver;
use crate::upload::UploadResponse;

fn parse_format(format: Option<&str>) -> Result<Option<Format>> {
    match format {
        Some(s) => Ok(Some(s.parse::<Format>()?)),
        None => Ok(None),
    }
}

/// Build the payload and print it without uploading.
pub fn cmd_json(file: &Path, options: &Options, format: Option<&str>) -> Result<String> {
    let format = parse_format(format)?;
    let analysis = Analysis::import_with_format(file, format)
        .with_context(|| format!("Failed to import coverage data from {}", file.display()))?;
    let resolver = Resolver::from_cwd().context("Failed to determine project root")?;

    let report = report::build_report(&analysis, &resolver, options);
    let mut out = report.to_json_pretty()?;
    out.push('\n');
    Ok(out)
}

/// Full flow: import, build, upload.
pub fn cmd_upload(file: &Path, options: &Options, format: Option<&str>) -> Result<String> {
    let response = ci::run(file, options, parse_format(format)?)?;
    Ok(format_response(&response))
}

/// Travis CI convenience: job id from `TRAVIS_JOB_ID`, service name
/// `travis-ci`, then the full flow.
pub fn cmd_travis(file: &Path, overrides: Options) -> Result<String> {
    let response = ci::travis(file, overrides)?;
    Ok(format_response(&response))
}

fn format_response(response: &UploadResponse) -> String {
    let mut out = String::new();
    if response.is_ok() {
        writeln!(out, "Upload accepted (HTTP 200)").unwrap();
    } else {
        writeln!(out, "Upload returned HTTP {}", response.status).unwrap();
    }
    if !response.body.is_empty() {
        writeln!(out, "{}", response.body.trim_end()).unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_json() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("lib.rs");
        std::fs::write(&source_path, "fn a() {}\nfn b() {}\n").unwrap();

        let lcov_path = dir.path().join("coverage.lcov");
        std::fs::write(
            &lcov_path,
            format!(
                "SF:{}\nDA:1,3\nDA:2,0\nend_of_record\n",
                source_path.display()
            ),
        )
        .unwrap();

        let options = Options::new().service_job_id("7");
        let out = cmd_json(&lcov_path, &options, None).unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["service_job_id"], "7");
        assert_eq!(value["service_name"], serde_json::Value::Null);
        assert_eq!(value["source_files"][0]["coverage"][0], 3);
        assert_eq!(value["source_files"][0]["coverage"][1], 0);
        // Trailing newline in the source yields a final null entry.
        assert_eq!(
            value["source_files"][0]["coverage"][2],
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_cmd_json_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("random.dat");
        std::fs::write(&path, "hello world").unwrap();

        let result = cmd_json(&path, &Options::new(), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_cmd_json_with_format_override() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("lib.rs");
        std::fs::write(&source_path, "fn a() {}\n").unwrap();

        // LCOV content under an extension that won't auto-detect.
        let data_path = dir.path().join("data.txt");
        std::fs::write(
            &data_path,
            format!("SF:{}\nDA:1,1\nend_of_record\n", source_path.display()),
        )
        .unwrap();

        let out = cmd_json(&data_path, &Options::new(), Some("lcov")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["source_files"][0]["coverage"][0], 1);

        assert!(cmd_json(&data_path, &Options::new(), Some("bogus")).is_err());
    }

    #[test]
    fn test_format_response_ok() {
        let out = format_response(&UploadResponse {
            status: 200,
            body: "{\"message\":\"Job #1\"}".to_string(),
        });
        assert!(out.contains("Upload accepted"));
        assert!(out.contains("Job #1"));
    }

    #[test]
    fn test_format_response_non_200() {
        let out = format_response(&UploadResponse {
            status: 422,
            body: "missing job id".to_string(),
        });
        assert!(out.contains("HTTP 422"));
        assert!(out.contains("missing job id"));
    }
}
