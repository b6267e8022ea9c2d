//! Local directory source and the yaml directory parser
//!
//! Used directly for on-box cluster files and, through
//! [`ClusterFileParser`], by every staging source.

use crate::domain::{ClusterData, ClusterFileParser, ClusterSet, ClusterSource};
use crate::error::{Result, SyncError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Extension of per-cluster files, without the dot
pub const CLUSTER_FILE_EXTENSION: &str = "yaml";

static CLUSTER_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)\.yaml$").expect("valid regex"));

/// Cluster name for a file name, if it is a cluster file
pub fn cluster_name_for(file_name: &str) -> Option<&str> {
    CLUSTER_FILE
        .captures(file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parses `<cluster>.yaml` files. Unreadable or malformed files are logged
/// and skipped; the rest of the directory still loads.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDirectoryParser;

impl YamlDirectoryParser {
    fn parse_file(path: &Path) -> Result<ClusterData> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(ClusterData::new());
        }
        let data: Option<ClusterData> = serde_yaml::from_str(&content)?;
        Ok(data.unwrap_or_default())
    }
}

impl ClusterFileParser for YamlDirectoryParser {
    fn parse_dir(&self, dir: &Path) -> Result<ClusterSet> {
        if !dir.is_dir() {
            return Err(SyncError::NotADirectory(dir.to_path_buf()));
        }

        let mut clusters = ClusterSet::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(cluster) = cluster_name_for(file_name) else {
                continue;
            };

            let path = entry.path();
            match Self::parse_file(&path) {
                Ok(data) => {
                    clusters.insert(cluster, data);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read cluster file, skipping");
                }
            }
        }

        debug!(dir = %dir.display(), clusters = clusters.len(), "parsed cluster directory");
        Ok(clusters)
    }
}

/// Cluster files already on this machine
pub struct LocalSource {
    name: String,
    dir: PathBuf,
    parser: Arc<dyn ClusterFileParser>,
}

impl LocalSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            name: "local".to_string(),
            dir: dir.into(),
            parser: Arc::new(YamlDirectoryParser),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn ClusterFileParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ClusterSource for LocalSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<ClusterSet> {
        self.parser
            .parse_dir(&self.dir)
            .map_err(|e| SyncError::source_failed(&self.name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClusterValue;
    use tempfile::TempDir;

    #[test]
    fn test_cluster_name_for() {
        assert_eq!(cluster_name_for("web.yaml"), Some("web"));
        assert_eq!(cluster_name_for("web.prod.yaml"), Some("web.prod"));
        assert_eq!(cluster_name_for("web.yml"), None);
        assert_eq!(cluster_name_for(".yaml"), None);
        assert_eq!(cluster_name_for(".web.yaml.rngsyn"), None);
    }

    #[test]
    fn test_reads_yaml_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("web.yaml"), "CLUSTER: web1,web2\n").unwrap();
        fs::write(dir.path().join("db.yaml"), "CLUSTER:\n- db1\n- db2\n").unwrap();
        fs::write(dir.path().join("README"), "not a cluster").unwrap();

        let clusters = LocalSource::new(dir.path()).read().unwrap();
        assert_eq!(clusters.names().collect::<Vec<_>>(), vec!["db", "web"]);
        assert_eq!(clusters.get("web").unwrap()["CLUSTER"], ClusterValue::from("web1,web2"));
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.yaml"), "CLUSTER: a\n").unwrap();
        fs::write(dir.path().join("bad.yaml"), "CLUSTER: [unterminated\n").unwrap();

        let clusters = LocalSource::new(dir.path()).read().unwrap();
        assert_eq!(clusters.len(), 1);
        assert!(clusters.contains("good"));
    }

    #[test]
    fn test_empty_file_is_empty_cluster() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.yaml"), "").unwrap();

        let clusters = LocalSource::new(dir.path()).read().unwrap();
        assert!(clusters.get("empty").unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_fails_source() {
        let err = LocalSource::new("/nonexistent/range/dir").read().unwrap_err();
        assert!(matches!(err, SyncError::Source { .. }));
    }
}
