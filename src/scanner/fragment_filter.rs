use crate::config::StitchConfig;
use regex::Regex;
use std::path::Path;

/// Decides which directory entries count as log fragments.
pub struct FragmentFilter {
    extension: String,
    exclude_patterns: Vec<Regex>,
}

impl FragmentFilter {
    pub fn new(config: &StitchConfig) -> Self {
        // Config::validate rejects bad patterns before we get here
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        Self {
            extension: config.extension.clone(),
            exclude_patterns,
        }
    }

    /// Literal suffix match on the file name. No case folding, no dot handling.
    pub fn matches_name(&self, filename: &str) -> bool {
        filename.ends_with(&self.extension)
    }

    /// Files directly inside the working directory (depth 1) are never fragments.
    pub fn is_fragment_depth(&self, depth: usize) -> bool {
        depth >= 2
    }

    pub fn should_traverse_directory(&self, relative_path: &Path) -> bool {
        if self.exclude_patterns.is_empty() {
            return true;
        }

        let path_str = relative_path.to_string_lossy().replace('\\', "/");
        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(&path_str))
    }
}

impl Default for FragmentFilter {
    fn default() -> Self {
        Self::new(&StitchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uppercase_suffix_only() {
        let filter = FragmentFilter::default();

        assert!(filter.matches_name("SAMPLE.CSV"));
        assert!(filter.matches_name("log1.CSV"));
        assert!(filter.matches_name(".CSV"));

        assert!(!filter.matches_name("sample.csv"));
        assert!(!filter.matches_name("sample.Csv"));
        assert!(!filter.matches_name("sample.CSV.bak"));
        assert!(!filter.matches_name("CSV"));
        assert!(!filter.matches_name("notes.TXT"));
    }

    #[test]
    fn test_suffix_is_not_dot_aware() {
        let config = StitchConfig {
            extension: "CSV".to_string(),
            ..StitchConfig::default()
        };
        let filter = FragmentFilter::new(&config);

        assert!(filter.matches_name("dataCSV"));
        assert!(filter.matches_name("data.CSV"));
    }

    #[test]
    fn test_root_files_are_not_fragments() {
        let filter = FragmentFilter::default();

        assert!(!filter.is_fragment_depth(0));
        assert!(!filter.is_fragment_depth(1));
        assert!(filter.is_fragment_depth(2));
        assert!(filter.is_fragment_depth(5));
    }

    #[test]
    fn test_no_patterns_traverses_everything() {
        let filter = FragmentFilter::default();

        assert!(filter.should_traverse_directory(Path::new("A")));
        assert!(filter.should_traverse_directory(Path::new(".hidden")));
        assert!(filter.should_traverse_directory(Path::new("target")));
    }

    #[test]
    fn test_exclude_patterns() {
        let config = StitchConfig {
            exclude_patterns: vec![r"^archive(/|$)".to_string(), r"old$".to_string()],
            ..StitchConfig::default()
        };
        let filter = FragmentFilter::new(&config);

        assert!(!filter.should_traverse_directory(Path::new("archive")));
        assert!(!filter.should_traverse_directory(Path::new("archive/2019")));
        assert!(!filter.should_traverse_directory(Path::new("2020/old")));
        assert!(filter.should_traverse_directory(Path::new("2020/new")));
        assert!(filter.should_traverse_directory(Path::new("archived")));
    }
}
