//! End-to-end flows: import, resolve, build, upload. Includes the Travis CI
//! convenience entry point, the only place an environment variable is read.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::analysis::Analysis;
use crate::options::Options;
use crate::parsers::Format;
use crate::report;
use crate::resolve::Resolver;
use crate::upload::{Client, UploadResponse};

pub const TRAVIS_SERVICE_NAME: &str = "travis-ci";

/// Run the full flow against an exported coverage file.
pub fn run(coverdata: &Path, options: &Options, format: Option<Format>) -> Result<UploadResponse> {
    let analysis = Analysis::import_with_format(coverdata, format)
        .with_context(|| format!("Failed to import coverage data from {}", coverdata.display()))?;
    let resolver = Resolver::from_cwd().context("Failed to determine project root")?;

    let report = report::build_report(&analysis, &resolver, options);

    let client = Client::new(options);
    client.upload(&report)
}

/// Default options for a Travis CI job: the job id from `TRAVIS_JOB_ID` and
/// the fixed service name.
pub fn travis_options() -> Result<Options> {
    let job_id = std::env::var("TRAVIS_JOB_ID")
        .context("TRAVIS_JOB_ID environment variable is required")?;
    Ok(Options::new()
        .service_job_id(job_id)
        .service_name(TRAVIS_SERVICE_NAME))
}

/// Travis CI convenience entry point: job metadata from the environment,
/// merged with caller overrides (overrides win), then the full flow.
pub fn travis(coverdata: &Path, overrides: Options) -> Result<UploadResponse> {
    let options = travis_options()?.merge(overrides);
    run(coverdata, &options, None)
}
