//! Locating the on-disk source file behind a tracked module and normalizing
//! its path relative to the project root.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::Analysis;
use crate::error::{CovpostError, Result};

/// Test runners execute from scratch directories below the real project
/// root: a `logs/...` tree or a hidden `.<runner>/...` directory. Strip
/// such a trailing suffix from the working directory to find the root.
static SCRATCH_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(/logs(/.*)?|/\.[^/]+(/.*)?)$").unwrap());

/// A module's source file, located on disk and named relative to the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Path relative to the project root (unchanged if outside the root).
    pub name: String,
    /// Where to read the file from.
    pub path: PathBuf,
}

/// Resolves tracked modules against a fixed project root.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
}

impl Resolver {
    /// Derive the project root from the current working directory.
    pub fn from_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::with_root(project_root(&cwd)))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate the source file for `module`.
    ///
    /// Fails with [`CovpostError::SourceNotFound`] when the module is not in
    /// the analysis or its recorded file no longer exists on disk. Callers
    /// treat this as "skip this file", not as a reason to abort the run.
    pub fn resolve(&self, analysis: &Analysis, module: &str) -> Result<ResolvedSource> {
        if analysis.line_hits(module).is_none() {
            return Err(CovpostError::SourceNotFound(module.to_string()));
        }

        let recorded = Path::new(module);
        let path = if recorded.is_absolute() {
            recorded.to_path_buf()
        } else {
            self.root.join(recorded)
        };

        if !path.is_file() {
            return Err(CovpostError::SourceNotFound(module.to_string()));
        }

        let name = match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => module.to_string(),
        };

        Ok(ResolvedSource { name, path })
    }
}

/// Compute the project root for a working directory by stripping a trailing
/// test-runner scratch suffix.
pub fn project_root(cwd: &Path) -> PathBuf {
    let s = cwd.to_string_lossy();
    let stripped = SCRATCH_SUFFIX_RE.replace(&s, "");
    if stripped.is_empty() {
        PathBuf::from("/")
    } else {
        PathBuf::from(stripped.into_owned())
    }
}
