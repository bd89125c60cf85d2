use crate::config::StitchConfig;
use crate::error::{Result, StitchError};
use crate::scanner::fragment_filter::FragmentFilter;
use crate::ui::format_bytes;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A log file found below the working directory.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
}

impl Fragment {
    pub fn new(source_path: PathBuf, relative_path: PathBuf) -> Self {
        let filename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            source_path,
            relative_path,
            filename,
        }
    }

    /// `./A/log1.CSV`, using the platform separator.
    pub fn display_path(&self) -> String {
        Path::new(".").join(&self.relative_path).display().to_string()
    }

    pub fn directory(&self) -> PathBuf {
        self.relative_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

pub struct FragmentScanner {
    filter: FragmentFilter,
    follow_links: bool,
}

impl FragmentScanner {
    pub fn new(config: &StitchConfig) -> Self {
        Self {
            filter: FragmentFilter::new(config),
            follow_links: config.follow_links,
        }
    }

    /// Lazily walks `root` and yields fragments in traversal order.
    ///
    /// Within a directory, files are yielded before subdirectories are entered,
    /// and both groups are sorted by name. Walk errors are yielded, not skipped.
    pub fn fragments<'a>(&'a self, root: &'a Path) -> impl Iterator<Item = Result<Fragment>> + 'a {
        WalkDir::new(root)
            .follow_links(self.follow_links)
            .sort_by(files_before_directories)
            .into_iter()
            .filter_entry(move |entry| self.should_traverse(entry, root))
            .filter_map(move |entry| match entry {
                Ok(entry) => self.process_entry(&entry, root).transpose(),
                Err(err) => Some(Err(StitchError::from(err))),
            })
    }

    /// Collects every fragment below `root`. An empty result is not an error.
    pub fn scan<P: AsRef<Path>>(&self, root: P) -> Result<Vec<Fragment>> {
        let root_path = root.as_ref();

        if !root_path.is_dir() {
            return Err(StitchError::InvalidPath {
                path: format!("{} is not a directory", root_path.display()),
            });
        }

        self.fragments(root_path).collect()
    }

    fn should_traverse(&self, entry: &DirEntry, root: &Path) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        match entry.path().strip_prefix(root) {
            Ok(relative) => self.filter.should_traverse_directory(relative),
            Err(_) => true,
        }
    }

    fn process_entry(&self, entry: &DirEntry, root: &Path) -> Result<Option<Fragment>> {
        if !self.filter.is_fragment_depth(entry.depth()) || !is_file_like(entry) {
            return Ok(None);
        }

        let filename = entry.file_name().to_string_lossy();
        if !self.filter.matches_name(&filename) {
            return Ok(None);
        }

        let relative_path = calculate_relative_path(entry.path(), root)?;
        Ok(Some(Fragment::new(entry.path().to_path_buf(), relative_path)))
    }

    pub fn get_statistics(&self, fragments: &[Fragment]) -> ScanStatistics {
        let mut fragments_by_directory = BTreeMap::new();
        for fragment in fragments {
            *fragments_by_directory
                .entry(fragment.directory())
                .or_insert(0) += 1;
        }

        // Sizes are informational; an unreadable file surfaces later, when it is appended
        let total_size = fragments
            .iter()
            .filter_map(|f| std::fs::metadata(&f.source_path).ok())
            .map(|m| m.len())
            .sum();

        ScanStatistics {
            total_fragments: fragments.len(),
            total_size,
            fragments_by_directory,
        }
    }
}

/// Symlinks that do not resolve to a directory are treated as files.
fn is_file_like(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && !entry.path().is_dir())
}

fn files_before_directories(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_is_dir = a.file_type().is_dir();
    let b_is_dir = b.file_type().is_dir();

    a_is_dir
        .cmp(&b_is_dir)
        .then_with(|| a.file_name().cmp(b.file_name()))
}

fn calculate_relative_path(file_path: &Path, root_path: &Path) -> Result<PathBuf> {
    let relative = file_path
        .strip_prefix(root_path)
        .map_err(|_| StitchError::InvalidPath {
            path: format!(
                "Cannot calculate relative path for {} from root {}",
                file_path.display(),
                root_path.display()
            ),
        })?;

    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(StitchError::InvalidPath {
            path: format!(
                "Path contains parent directory references: {}",
                relative.display()
            ),
        });
    }

    Ok(relative.to_path_buf())
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_fragments: usize,
    pub total_size: u64,
    pub fragments_by_directory: BTreeMap<PathBuf, usize>,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Fragments: {}\n  Total size: {}\n",
            self.total_fragments,
            format_bytes(self.total_size)
        );

        if !self.fragments_by_directory.is_empty() {
            summary.push_str("  Fragments by directory:\n");
            for (dir, count) in &self.fragments_by_directory {
                summary.push_str(&format!("    {}: {}\n", dir.display(), count));
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn relative_paths(fragments: &[Fragment]) -> Vec<String> {
        fragments
            .iter()
            .map(|f| f.relative_path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_fragment_creation() {
        let fragment = Fragment::new(
            PathBuf::from("/data/A/log1.CSV"),
            PathBuf::from("A/log1.CSV"),
        );

        assert_eq!(fragment.filename, "log1.CSV");
        assert_eq!(fragment.directory(), PathBuf::from("A"));
        assert_eq!(
            fragment.display_path(),
            Path::new(".").join("A").join("log1.CSV").display().to_string()
        );
    }

    #[test]
    fn test_traversal_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write(root, "B/log2.CSV", "b");
        write(root, "A/sub/deep.CSV", "deep");
        write(root, "A/z.CSV", "z");
        write(root, "A/log1.CSV", "a");

        let scanner = FragmentScanner::new(&StitchConfig::default());
        let fragments = scanner.scan(root).unwrap();

        assert_eq!(
            relative_paths(&fragments),
            vec!["A/log1.CSV", "A/z.CSV", "A/sub/deep.CSV", "B/log2.CSV"]
        );
    }

    #[test]
    fn test_root_level_fragments_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write(root, "ROOT.CSV", "root");
        write(root, "A/log1.CSV", "a");

        let scanner = FragmentScanner::new(&StitchConfig::default());
        let fragments = scanner.scan(root).unwrap();

        assert_eq!(relative_paths(&fragments), vec!["A/log1.CSV"]);
    }

    #[test]
    fn test_case_sensitive_match() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write(root, "A/sample.csv", "lower");
        write(root, "A/SAMPLE.CSV", "upper");
        write(root, "A/readme.txt", "text");

        let scanner = FragmentScanner::new(&StitchConfig::default());
        let fragments = scanner.scan(root).unwrap();

        assert_eq!(relative_paths(&fragments), vec!["A/SAMPLE.CSV"]);
    }

    #[test]
    fn test_empty_tree_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("empty")).unwrap();

        let scanner = FragmentScanner::new(&StitchConfig::default());
        let fragments = scanner.scan(temp_dir.path()).unwrap();

        assert!(fragments.is_empty());
    }

    #[test]
    fn test_directory_named_like_fragment_is_descended() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write(root, "session.CSV/inner.CSV", "inner");

        let scanner = FragmentScanner::new(&StitchConfig::default());
        let fragments = scanner.scan(root).unwrap();

        assert_eq!(relative_paths(&fragments), vec!["session.CSV/inner.CSV"]);
    }

    #[test]
    fn test_excluded_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write(root, "A/log1.CSV", "a");
        write(root, "archive/old.CSV", "old");

        let config = StitchConfig {
            exclude_patterns: vec!["^archive$".to_string()],
            ..StitchConfig::default()
        };
        let scanner = FragmentScanner::new(&config);
        let fragments = scanner.scan(root).unwrap();

        assert_eq!(relative_paths(&fragments), vec!["A/log1.CSV"]);
    }

    #[test]
    fn test_scan_rejects_non_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let scanner = FragmentScanner::new(&StitchConfig::default());
        assert!(matches!(
            scanner.scan(&file),
            Err(StitchError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_scan_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write(root, "A/log1.CSV", "1234");
        write(root, "A/log2.CSV", "56");
        write(root, "B/log3.CSV", "7");

        let scanner = FragmentScanner::new(&StitchConfig::default());
        let fragments = scanner.scan(root).unwrap();
        let stats = scanner.get_statistics(&fragments);

        assert_eq!(stats.total_fragments, 3);
        assert_eq!(stats.total_size, 7);
        assert_eq!(stats.fragments_by_directory.get(Path::new("A")), Some(&2));
        assert!(stats.display_summary().contains("Fragments: 3"));
    }
}
