//! @ai:module:intent Scan files and directory trees for todos
//! @ai:module:layer application
//! @ai:module:public_api scan_paths, ScanReport, ScanFailure
//! @ai:module:depends_on extractor, config, language, error
//! @ai:module:stateless true
//! @ai:module:thread_safe true
//!
//! Files are parsed in parallel with rayon. The report keeps the walk order
//! (paths as given, directory entries sorted by name) regardless of which
//! worker finishes first.

use crate::annotation::{ScannedFile, Todo};
use crate::config::ScanConfig;
use crate::error::Result;
use crate::extractor::{extract_file, ExtractOptions};
use crate::language::LanguageRegistry;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// @ai:intent A file found during a directory walk that could not be scanned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub message: String,
}

/// @ai:intent Result of scanning one or more paths
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub files: Vec<ScannedFile>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// @ai:intent Iterate over every todo in scan order
    pub fn todos(&self) -> impl Iterator<Item = &Todo> {
        self.files.iter().flat_map(|f| f.todos.iter())
    }

    /// @ai:intent Count todos across all files
    pub fn total(&self) -> usize {
        self.files.iter().map(|f| f.todos.len()).sum()
    }
}

/// A file queued for extraction. Explicitly named files fail the whole scan
/// when unreadable; walked files only produce a `ScanFailure`.
struct Candidate {
    path: PathBuf,
    explicit: bool,
}

/// @ai:intent Scan files and directories, collecting todos in stable order
/// @ai:pre every path exists
/// @ai:post Err only for an unreadable explicit file, a bad config, or a missing path
/// @ai:effects fs:read
pub fn scan_paths(
    paths: &[PathBuf],
    registry: &LanguageRegistry,
    config: &ScanConfig,
    options: &ExtractOptions,
) -> Result<ScanReport> {
    let excludes = config.exclude_patterns()?;
    let mut report = ScanReport::default();
    let mut candidates = Vec::new();

    for path in paths {
        if path.is_dir() {
            let walked = walk_directory(path, registry, config, options, &excludes);
            candidates.extend(walked.candidates);
            report.failures.extend(walked.failures);
        } else {
            candidates.push(Candidate {
                path: path.clone(),
                explicit: true,
            });
        }
    }

    let results: Vec<(Candidate, Result<ScannedFile>)> = candidates
        .into_par_iter()
        .map(|candidate| {
            let result = extract_file(&candidate.path, registry, options);
            (candidate, result)
        })
        .collect();

    for (candidate, result) in results {
        match result {
            Ok(file) => {
                report.files_scanned += 1;
                report.files.push(file);
            }
            Err(e) if candidate.explicit => return Err(e),
            Err(e) => {
                warn!(path = %candidate.path.display(), error = %e, "skipping file");
                report.failures.push(ScanFailure {
                    path: candidate.path,
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(
        files = report.files_scanned,
        todos = report.total(),
        failures = report.failures.len(),
        "scan finished"
    );
    Ok(report)
}

#[derive(Default)]
struct Walked {
    candidates: Vec<Candidate>,
    failures: Vec<ScanFailure>,
}

fn walk_directory(
    root: &Path,
    registry: &LanguageRegistry,
    config: &ScanConfig,
    options: &ExtractOptions,
    excludes: &[Regex],
) -> Walked {
    let mut walked = Walked::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !skip_entry(e, root, config, excludes));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), error = %e, "cannot walk");
                walked.failures.push(ScanFailure {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if options.language.is_some()
            || config.include_plain_text
            || registry.is_supported_file(path)
        {
            walked.candidates.push(Candidate {
                path: path.to_path_buf(),
                explicit: false,
            });
        }
    }
    walked
}

/// @ai:intent Decide whether a walked entry (and everything under it) is skipped
/// @ai:edge_cases directories are matched with a trailing '/' so "^target/" prunes the tree
fn skip_entry(entry: &DirEntry, root: &Path, config: &ScanConfig, excludes: &[Regex]) -> bool {
    let hidden = entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'));
    if hidden && !config.include_hidden {
        return true;
    }

    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    let mut display = relative.to_string_lossy().replace('\\', "/");
    if entry.file_type().is_dir() {
        display.push('/');
    }
    excludes.iter().any(|re| re.is_match(&display))
}
