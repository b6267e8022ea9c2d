//! Version-control sources: export a repository read-only into staging, then
//! parse a subdirectory of the export

use super::local::YamlDirectoryParser;
use super::staging_dir;
use crate::domain::{ClusterFileParser, ClusterSet, ClusterSource};
use crate::error::{Result, SyncError};
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

/// Materializes a repository path into an existing, empty directory
pub trait VcsExporter: Send + Sync {
    /// Short label, also used as the staging directory prefix
    fn kind(&self) -> &str;

    fn export(&self, repo: &str, dest: &Path) -> Result<()>;
}

/// Clone with libgit2
#[derive(Debug, Clone, Default)]
pub struct GitExporter {
    branch: Option<String>,
}

impl GitExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

impl VcsExporter for GitExporter {
    fn kind(&self) -> &str {
        "git"
    }

    fn export(&self, repo: &str, dest: &Path) -> Result<()> {
        let mut builder = git2::build::RepoBuilder::new();
        if let Some(branch) = &self.branch {
            builder.branch(branch);
        }
        builder
            .clone(repo, dest)
            .map_err(|e| SyncError::source_failed("git", format!("clone of {} failed: {}", repo, e)))?;
        Ok(())
    }
}

/// `svn export --force` through the svn command line client
#[derive(Debug, Clone)]
pub struct SvnExporter {
    binary: PathBuf,
}

impl Default for SvnExporter {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("svn"),
        }
    }
}

impl SvnExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

impl VcsExporter for SvnExporter {
    fn kind(&self) -> &str {
        "svn"
    }

    fn export(&self, repo: &str, dest: &Path) -> Result<()> {
        let output = Command::new(&self.binary)
            .args(["export", "--force", "--non-interactive", "-r", "HEAD", repo])
            .arg(dest)
            .output()
            .map_err(|e| {
                SyncError::source_failed("svn", format!("could not run {}: {}", self.binary.display(), e))
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SyncError::source_failed(
                "svn",
                format!(
                    "export of {} failed: {}",
                    repo,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ))
        }
    }
}

/// Repository export read through a [`ClusterFileParser`]
pub struct VcsSource<E: VcsExporter> {
    name: String,
    exporter: E,
    repo: String,
    subdir: PathBuf,
    parser: Arc<dyn ClusterFileParser>,
}

impl<E: VcsExporter> VcsSource<E> {
    /// `subdir` is relative to the export root; empty means the root itself
    pub fn new(exporter: E, repo: impl Into<String>, subdir: impl Into<PathBuf>) -> Result<Self> {
        let subdir = subdir.into();
        let name = exporter.kind().to_string();
        if !is_contained(&subdir) {
            return Err(SyncError::source_failed(
                name,
                format!("subdirectory must be relative and stay inside the export: {}", subdir.display()),
            ));
        }

        Ok(Self {
            name,
            exporter,
            repo: repo.into(),
            subdir,
            parser: Arc::new(YamlDirectoryParser),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn ClusterFileParser>) -> Self {
        self.parser = parser;
        self
    }
}

impl<E: VcsExporter> ClusterSource for VcsSource<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<ClusterSet> {
        let staging = staging_dir(&format!("range_sync_{}-", self.exporter.kind()))?;
        debug!(repo = %self.repo, staging = %staging.path().display(), "exporting repository");

        self.exporter
            .export(&self.repo, staging.path())
            .map_err(|e| match e {
                SyncError::Source { message, .. } => SyncError::source_failed(&self.name, message),
                other => SyncError::source_failed(&self.name, other),
            })?;

        let clusters = self
            .parser
            .parse_dir(&staging.path().join(&self.subdir))
            .map_err(|e| SyncError::source_failed(&self.name, e))?;

        info!(source = %self.name, repo = %self.repo, clusters = clusters.len(), "read vcs source");
        Ok(clusters)
    }
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
