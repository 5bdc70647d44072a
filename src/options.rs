//! Report options: job metadata and upload overrides.
//!
//! Defaults and caller overrides are combined with [`Options::merge`];
//! the override side wins on collision, everything else passes through.

use std::collections::BTreeMap;

/// Named option fields plus a passthrough map for extra keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub service_job_id: Option<String>,
    pub service_name: Option<String>,
    /// Upload endpoint override.
    pub url: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service_job_id(mut self, value: impl Into<String>) -> Self {
        self.service_job_id = Some(value.into());
        self
    }

    pub fn service_name(mut self, value: impl Into<String>) -> Self {
        self.service_name = Some(value.into());
        self
    }

    pub fn url(mut self, value: impl Into<String>) -> Self {
        self.url = Some(value.into());
        self
    }

    /// Merge `overrides` over `self`. For any field present in both, the
    /// override value wins; fields present only on one side pass through.
    #[must_use]
    pub fn merge(self, overrides: Options) -> Options {
        let mut extra = self.extra;
        extra.extend(overrides.extra);

        Options {
            service_job_id: overrides.service_job_id.or(self.service_job_id),
            service_name: overrides.service_name.or(self.service_name),
            url: overrides.url.or(self.url),
            extra,
        }
    }
}
