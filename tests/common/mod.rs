use std::path::PathBuf;

use tempfile::TempDir;

/// A temp project tree to resolve source files against. The caller must
/// hold onto the `TempDir` to keep the tree alive.
pub fn setup_project() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Write a source file under the project, creating parent directories.
pub fn write_source(project: &TempDir, rel: &str, content: &str) -> PathBuf {
    let path = project.path().join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Write an exported LCOV coverage file under the project.
pub fn write_lcov(project: &TempDir, records: &str) -> PathBuf {
    let path = project.path().join("coverage.lcov");
    std::fs::write(&path, records).unwrap();
    path
}
