//! Staging → per-file atomic publish → stale-file cleanup

use super::atomic::atomic_copy;
use super::protect::ProtectedFiles;
use crate::domain::{ClusterData, ClusterSet, ClusterValue, CLUSTER_KEY};
use crate::error::{Result, SyncError};
use crate::features::normalize::normalize;
use crate::features::sources::{local::cluster_name_for, CLUSTER_FILE_EXTENSION};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Output file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(SyncError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

/// What a publish did
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Files atomically replaced or created
    pub written: Vec<String>,
    /// Files whose publish failed; the previous generation (if any) remains
    pub failed: Vec<(String, SyncError)>,
    /// Stale files removed
    pub deleted: Vec<String>,
    /// Stale files kept because a protection pattern matched
    pub protected: Vec<String>,
    /// Stale files that could not be removed
    pub failed_deletes: Vec<(String, SyncError)>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.failed_deletes.is_empty()
    }
}

/// Publishes cluster sets into one output directory.
///
/// Concurrent publishes to the same directory must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct SyncWriter {
    output_dir: PathBuf,
    format: OutputFormat,
    clean: bool,
    protected: ProtectedFiles,
}

impl SyncWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: OutputFormat::Yaml,
            clean: true,
            protected: ProtectedFiles::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_protected(mut self, protected: ProtectedFiles) -> Self {
        self.protected = protected;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Normalize and publish `clusters`, then (if cleaning) delete output
    /// files whose cluster is no longer present.
    ///
    /// A file that fails to publish is logged and reported; the others still go out.
    pub fn publish(&self, clusters: &ClusterSet) -> Result<PublishReport> {
        if !self.output_dir.is_dir() {
            return Err(SyncError::NotADirectory(self.output_dir.clone()));
        }

        let staging = tempfile::Builder::new()
            .prefix("range_sync_output-")
            .tempdir()?;

        let mut report = PublishReport::default();
        for (name, data) in clusters.iter() {
            if let Err(e) = write_cluster_file(name, data, staging.path()) {
                warn!(cluster = %name, error = %e, "could not stage cluster");
                report.failed.push((cluster_file_name(name), e));
            }
        }

        self.sync_dir(staging.path(), &mut report)?;

        info!(
            output = %self.output_dir.display(),
            written = report.written.len(),
            failed = report.failed.len(),
            deleted = report.deleted.len(),
            protected = report.protected.len(),
            failed_deletes = report.failed_deletes.len(),
            "published cluster set"
        );
        Ok(report)
    }

    fn sync_dir(&self, staging: &Path, report: &mut PublishReport) -> Result<()> {
        let staged = cluster_files(staging)?;
        let existing = cluster_files(&self.output_dir)?;

        for file in &staged {
            match atomic_copy(staging, file, &self.output_dir) {
                Ok(()) => report.written.push(file.clone()),
                Err(e) => {
                    warn!(file = %file, error = %e, "could not publish file");
                    report.failed.push((file.clone(), e));
                }
            }
        }

        if self.clean {
            self.remove_stale(existing.difference(&staged), report);
        }
        Ok(())
    }

    /// Delete `stale` files unless protected or their publish failed.
    /// A failed delete is recorded and the rest still go.
    fn remove_stale<'a>(&self, stale: impl Iterator<Item = &'a String>, report: &mut PublishReport) {
        let failed: BTreeSet<String> = report.failed.iter().map(|(f, _)| f.clone()).collect();
        for file in stale {
            if failed.contains(file) {
                continue;
            }
            if self.protected.is_protected(file) {
                info!(file = %file, "skipping protected file");
                report.protected.push(file.clone());
                continue;
            }
            warn!(file = %file, "deleting stale file");
            let path = self.output_dir.join(file);
            match fs::remove_file(&path) {
                Ok(()) => report.deleted.push(file.clone()),
                Err(e) => {
                    warn!(file = %file, error = %e, "could not delete stale file");
                    report.failed_deletes.push((file.clone(), SyncError::publish(path, e)));
                }
            }
        }
    }
}

/// Publish with the default yaml format
pub fn publish<I, S>(
    clusters: &ClusterSet,
    output_dir: impl Into<PathBuf>,
    clean: bool,
    protected: I,
) -> Result<PublishReport>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    SyncWriter::new(output_dir)
        .with_clean(clean)
        .with_protected(ProtectedFiles::new(protected)?)
        .publish(clusters)
}

fn cluster_file_name(cluster: &str) -> String {
    format!("{}.{}", cluster, CLUSTER_FILE_EXTENSION)
}

/// Plain files in `dir` that look like cluster files
fn cluster_files(dir: &Path) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if cluster_name_for(name).is_some() {
                files.insert(name.to_string());
            }
        }
    }
    Ok(files)
}

/// Normalized yaml body for one cluster; always carries `CLUSTER`
pub fn render_cluster(data: &ClusterData) -> Result<String> {
    let mut output = normalize(data.clone());
    if output.is_empty() {
        debug!("no data for cluster, writing bare CLUSTER key");
    }
    output
        .entry(CLUSTER_KEY.to_string())
        .or_insert_with(ClusterValue::empty);
    Ok(serde_yaml::to_string(&output)?)
}

fn write_cluster_file(cluster: &str, data: &ClusterData, dir: &Path) -> Result<()> {
    if cluster.is_empty() || cluster.contains('/') || cluster.contains('\\') || cluster.starts_with('.') {
        return Err(SyncError::publish(
            dir.join(cluster),
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "cluster name is not a plain file name"),
        ));
    }
    fs::write(dir.join(cluster_file_name(cluster)), render_cluster(data)?)?;
    Ok(())
}
