// feedsniff - core/discovery.rs
//
// Recursive directory traversal and candidate feed file discovery.
//
// Reads only file *metadata* (size), never file contents; reading
// and classifying is owned by the app layer (app::batch).
//
//   - Per-file I/O errors are non-fatal and collected as warnings.
//   - max_files and max_depth are clamped to named absolute bounds.
//   - Exclude patterns short-circuit directory descent via filter_entry so
//     excluded subtrees (e.g. node_modules/) are never traversed at all.

use crate::core::model::DiscoveredFile;
use crate::util::constants;
use crate::util::error::DiscoveryError;
use std::path::Path;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of matching files to return.
    pub max_files: usize,

    /// Glob patterns (filename-only) that a file MUST match to be included.
    /// An empty list means "include everything that is not excluded".
    pub include_patterns: Vec<String>,

    /// Glob patterns matched against filenames AND directory component names.
    /// Matching files are skipped; matching directories are not descended into.
    pub exclude_patterns: Vec<String>,

    /// File size (bytes) at or above which the `is_large` flag is set.
    pub large_file_threshold: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
        }
    }
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover candidate feed files under `root`, applying include/exclude
/// glob patterns. Results are sorted by path so runs are reproducible.
///
/// `on_file_found` is called once per accepted file with the running count.
///
/// # Non-fatal errors
/// Files/directories that cannot be accessed are recorded as human-readable
/// strings in the returned warnings vector and do NOT cause an `Err`.
///
/// # Fatal errors
/// Returns `Err` only if the root path is invalid (`RootNotFound`,
/// `NotADirectory`, `PermissionDenied`).
pub fn discover_files<F>(
    root: &Path,
    config: &DiscoveryConfig,
    mut on_file_found: F,
) -> Result<(Vec<DiscoveredFile>, Vec<String>), DiscoveryError>
where
    F: FnMut(&DiscoveredFile, usize),
{
    // `fs::metadata` rather than `Path::is_dir`, which maps every error
    // (including PermissionDenied) to `false`.
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let max_files = config
        .max_files
        .clamp(constants::MIN_MAX_FILES, constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        max_files,
        include = ?config.include_patterns,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut files: Vec<DiscoveredFile> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut total_found = 0usize;

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Wildcard patterns (e.g. "*.gz") are only tested against
            // filenames; literal ones also prune directories.
            if e.file_type().is_dir() && e.depth() > 0 {
                let name = e.file_name().to_str().unwrap_or("");
                return !is_excluded_component(name, &exclude_pats);
            }
            true
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if is_excluded_filename(file_name, &exclude_pats) {
            tracing::trace!(file = file_name, "Excluded by pattern");
            continue;
        }
        if !is_included(file_name, &include_pats) {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        }

        total_found += 1;
        if files.len() >= max_files {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                let msg = format!("Cannot read metadata for '{}': {e}", path.display());
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        let discovered =
            DiscoveredFile::new(path.to_path_buf(), metadata.len(), config.large_file_threshold);

        on_file_found(&discovered, files.len() + 1);
        files.push(discovered);
    }

    if total_found > files.len() && files.len() == max_files {
        warnings.push(format!(
            "{total_found} candidate files were found but the limit is {max_files}. \
             Only the first {max_files} (by path) will be examined. \
             Raise [discovery] max_files in config if you need more."
        ));
        tracing::info!(total_found, limit = max_files, "File list truncated");
    }

    tracing::debug!(
        total_found,
        files = files.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((files, warnings))
}

/// Describe a single file named directly by the user, outside any walk.
///
/// Never fails: a file whose metadata cannot be read is described with
/// size 0 and left for the reader to report.
pub fn describe_file(path: &Path, large_file_threshold: u64) -> DiscoveredFile {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "Cannot read metadata");
            0
        }
    };
    DiscoveredFile::new(path.to_path_buf(), size, large_file_threshold)
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile glob pattern strings, logging and skipping any that are invalid.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Literal exclude patterns (no wildcards) double as directory name matchers
/// ("node_modules", ".git").
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

/// An empty include list means "include all".
fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    include_pats.is_empty() || include_pats.iter().any(|p| p.matches(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_temp_tree() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        fs::write(root.join("blog.xml"), "<rss version=\"2.0\"></rss>").expect("write blog.xml");
        fs::write(root.join("feed.json"), "{}").expect("write feed.json");
        fs::write(root.join("notes.txt"), "not a candidate").expect("write notes.txt");
        fs::write(root.join("archive.xml.gz"), "binary").expect("write .gz");

        let sub = root.join("podcasts");
        fs::create_dir(&sub).expect("mkdir podcasts");
        fs::write(sub.join("episodes.rss"), "<rss/>").expect("write episodes.rss");

        let node = root.join("node_modules");
        fs::create_dir(&node).expect("mkdir node_modules");
        fs::write(node.join("package.json"), "{}").expect("write package.json");

        dir
    }

    fn names(files: &[DiscoveredFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_discovers_feed_candidates() {
        let dir = make_temp_tree();
        let (files, warnings) =
            discover_files(dir.path(), &DiscoveryConfig::default(), |_, _| {}).unwrap();

        let names = names(&files);
        assert!(names.contains(&"blog.xml".to_string()), "got {names:?}");
        assert!(names.contains(&"feed.json".to_string()));
        assert!(names.contains(&"episodes.rss".to_string()));
        assert!(!names.contains(&"notes.txt".to_string()), "txt is not included");
        assert!(!names.contains(&"archive.xml.gz".to_string()), "gz excluded");
        assert!(!names.contains(&"package.json".to_string()), "node_modules pruned");
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_results_sorted_by_path() {
        let dir = make_temp_tree();
        let (files, _) =
            discover_files(dir.path(), &DiscoveryConfig::default(), |_, _| {}).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn test_max_depth_1_excludes_subdirs() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_depth: 1,
            ..Default::default()
        };
        let (files, _) = discover_files(dir.path(), &config, |_, _| {}).unwrap();
        assert!(!names(&files).contains(&"episodes.rss".to_string()));
    }

    #[test]
    fn test_max_files_truncates_with_warning() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_files: 2,
            ..Default::default()
        };
        let (files, warnings) = discover_files(dir.path(), &config, |_, _| {}).unwrap();
        assert_eq!(files.len(), 2);
        let text = warnings.join(" ");
        assert!(text.contains('3') && text.contains('2'), "got: {text}");
    }

    #[test]
    fn test_empty_include_list_accepts_everything_not_excluded() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            include_patterns: Vec::new(),
            ..Default::default()
        };
        let (files, _) = discover_files(dir.path(), &config, |_, _| {}).unwrap();
        assert!(names(&files).contains(&"notes.txt".to_string()));
    }

    #[test]
    fn test_root_not_found() {
        let result = discover_files(
            Path::new("/nonexistent/path/feedsniff"),
            &DiscoveryConfig::default(),
            |_, _| {},
        );
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_root_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("feed.xml");
        fs::write(&file, "content").unwrap();
        let result = discover_files(&file, &DiscoveryConfig::default(), |_, _| {});
        assert!(matches!(result, Err(DiscoveryError::NotADirectory { .. })));
    }

    #[test]
    fn test_progress_callback_and_large_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tiny.xml"), "x").unwrap();

        let mut seen = 0usize;
        let config = DiscoveryConfig {
            large_file_threshold: 0,
            ..Default::default()
        };
        let (files, _) = discover_files(dir.path(), &config, |_, _| seen += 1).unwrap();
        assert_eq!(seen, 1);
        assert!(files[0].is_large, "threshold 0 flags everything");
        assert_eq!(files[0].size, 1);
    }

    #[test]
    fn test_describe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.xml");
        fs::write(&path, vec![b'x'; 64]).unwrap();

        let small = describe_file(&path, 65);
        assert_eq!(small.size, 64);
        assert!(!small.is_large);
        assert!(describe_file(&path, 64).is_large);

        let missing = describe_file(&dir.path().join("missing.xml"), 1);
        assert_eq!(missing.size, 0);
        assert!(!missing.is_large);
    }
}
