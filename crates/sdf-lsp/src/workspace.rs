//! Discovery of schema files under a workspace root.

use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::Url;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::SdfUserConfig;

/// A schema file read from disk.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub uri: Url,
    pub content: String,
}

/// Read every schema file under `root`, skipping excluded paths.
///
/// Entries that cannot be read are logged and skipped; only a bad root or a
/// malformed exclude pattern fails the scan.
pub fn scan_workspace(root: &Path, config: &SdfUserConfig) -> Result<Vec<ScannedFile>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let excludes = config
        .exclude
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|error| ScanError::Pattern {
                pattern: pattern.clone(),
                error,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // matching directories too keeps the walk out of excluded trees
    let is_excluded = |path: &Path| {
        let relative = path.strip_prefix(root).unwrap_or(path);
        !relative.as_os_str().is_empty() && excludes.iter().any(|p| p.matches_path(relative))
    };

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry.path()));
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read workspace entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || !config.is_schema_file(path) {
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(?path, "Failed to read schema file: {}", e);
                continue;
            }
        };
        let Ok(uri) = Url::from_file_path(path) else {
            warn!(?path, "Cannot express path as a file URI");
            continue;
        };
        files.push(ScannedFile { uri, content });
    }

    info!(?root, files = files.len(), "Scanned workspace");
    Ok(files)
}

/// Error scanning a workspace.
#[derive(Debug)]
pub enum ScanError {
    NotADirectory { path: PathBuf },
    Pattern {
        pattern: String,
        error: glob::PatternError,
    },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::NotADirectory { path } => {
                write!(f, "Workspace root {} is not a directory", path.display())
            }
            ScanError::Pattern { pattern, error } => {
                write!(f, "Invalid exclude pattern {:?}: {}", pattern, error)
            }
        }
    }
}

impl std::error::Error for ScanError {}
