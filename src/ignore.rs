use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Gitignore-style exclude patterns applied during discovery
pub struct ExcludeFilter {
    inner: Gitignore,
}

impl ExcludeFilter {
    pub fn new(root: &Path, patterns: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!("Ignoring invalid exclude pattern {:?}: {}", pattern, e);
            }
        }

        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        self.inner.matched(path, is_dir).is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(patterns: &[&str]) -> ExcludeFilter {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        ExcludeFilter::new(Path::new("/repo"), &patterns)
    }

    #[test]
    fn test_directory_and_glob_patterns() {
        let f = filter(&["legacy/", "*_test.py"]);

        assert!(f.is_excluded(Path::new("/repo/legacy"), true));
        assert!(!f.is_excluded(Path::new("/repo/legacy"), false));
        assert!(f.is_excluded(Path::new("/repo/src/parser_test.py"), false));
        assert!(!f.is_excluded(Path::new("/repo/src/parser.py"), false));
    }

    #[test]
    fn test_no_patterns_excludes_nothing() {
        let f = filter(&[]);

        assert!(f.is_empty());
        assert!(!f.is_excluded(Path::new("/repo/anything.py"), false));
    }
}
