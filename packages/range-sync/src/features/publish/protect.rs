//! Allow-list of output files that cleanup must never delete

use crate::config::ConfigError;
use regex::RegexSet;

/// Compiled protection patterns; a file is protected if any pattern matches
/// anywhere in its name
#[derive(Debug, Clone)]
pub struct ProtectedFiles {
    patterns: RegexSet,
}

impl Default for ProtectedFiles {
    fn default() -> Self {
        Self {
            patterns: RegexSet::empty(),
        }
    }
}

impl ProtectedFiles {
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(|p| p.as_ref().to_string()).collect();
        // compile one by one so the error names the bad pattern
        for pattern in &patterns {
            regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }
        let patterns = RegexSet::new(&patterns).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(Self { patterns })
    }

    pub fn is_protected(&self, file_name: &str) -> bool {
        self.patterns.is_match(file_name)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_pattern() {
        let protected = ProtectedFiles::new([r"^version\.yaml$"]).unwrap();
        assert!(protected.is_protected("version.yaml"));
        assert!(!protected.is_protected("old_version.yaml"));
        assert!(!protected.is_protected("old_cluster.yaml"));
    }

    #[test]
    fn test_unanchored_pattern_searches() {
        let protected = ProtectedFiles::new(["^infra-", "static"]).unwrap();
        assert!(protected.is_protected("infra-dns.yaml"));
        assert!(protected.is_protected("my_static_hosts.yaml"));
        assert!(!protected.is_protected("web.yaml"));
    }

    #[test]
    fn test_empty_protects_nothing() {
        let protected = ProtectedFiles::default();
        assert!(protected.is_empty());
        assert!(!protected.is_protected("version.yaml"));
    }

    #[test]
    fn test_bad_pattern_named_in_error() {
        let err = ProtectedFiles::new(["ok", "(broken"]).unwrap_err();
        match err {
            ConfigError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(broken"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
