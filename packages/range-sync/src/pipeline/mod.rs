//! Sync runner: sources → merge → normalize → publish
//!
//! Sources are read one after another and folded into a single cluster set,
//! each with its own policy. Nothing is published unless every source reads
//! successfully.

use crate::config::{SourceEntry, SourceKind, SyncConfig};
use crate::domain::{ClusterSet, ClusterSource, MergePolicy};
use crate::error::{Result, SyncError};
use crate::features::merge::fold;
use crate::features::publish::{OutputFormat, PublishReport, SyncWriter};
use crate::features::sources::{
    GitExporter, HttpIndexSource, LocalSource, ReverseIndexSource, SvnExporter, VcsSource,
    VersionSource,
};
use range_client::RangeClient;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A source and the policy it merges with
pub struct PlannedSource {
    pub label: String,
    pub policy: MergePolicy,
    pub source: Box<dyn ClusterSource>,
}

impl PlannedSource {
    pub fn new(source: Box<dyn ClusterSource>, policy: MergePolicy) -> Self {
        Self {
            label: source.name().to_string(),
            policy,
            source,
        }
    }
}

/// Result of a full run
#[derive(Debug)]
pub struct SyncOutcome {
    pub clusters: usize,
    pub report: PublishReport,
    pub duration: Duration,
}

pub struct SyncRunner {
    writer: SyncWriter,
    sources: Vec<PlannedSource>,
}

impl SyncRunner {
    /// Build every configured source and the writer
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let writer = writer_for(config)?;
        let sources = config
            .sources
            .iter()
            .map(|entry| {
                Ok(PlannedSource {
                    label: entry.label().to_string(),
                    policy: entry.policy,
                    source: build_source(entry, config)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(writer, sources))
    }

    pub fn new(writer: SyncWriter, sources: Vec<PlannedSource>) -> Self {
        Self { writer, sources }
    }

    pub fn sources(&self) -> &[PlannedSource] {
        &self.sources
    }

    /// Read and fold every source, in order
    pub fn collect(&self) -> Result<ClusterSet> {
        let mut clusters = ClusterSet::new();
        for planned in &self.sources {
            let started = Instant::now();
            let added = planned.source.read().map_err(|e| match e {
                SyncError::Source { .. } => e,
                other => SyncError::source_failed(&planned.label, other),
            })?;

            debug!(
                source = %planned.label,
                policy = %planned.policy,
                clusters = added.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "source read"
            );
            clusters = fold(clusters, added, planned.policy);
        }
        Ok(clusters)
    }

    /// Collect and publish
    pub fn run(&self) -> Result<SyncOutcome> {
        let started = Instant::now();
        let clusters = self.collect()?;
        let report = self.writer.publish(&clusters)?;

        let outcome = SyncOutcome {
            clusters: clusters.len(),
            report,
            duration: started.elapsed(),
        };
        info!(
            clusters = outcome.clusters,
            failed = outcome.report.failed.len(),
            duration_ms = outcome.duration.as_millis() as u64,
            "sync finished"
        );
        Ok(outcome)
    }
}

fn writer_for(config: &SyncConfig) -> Result<SyncWriter> {
    let format: OutputFormat = config.output_format.parse()?;
    Ok(SyncWriter::new(&config.output_dir)
        .with_format(format)
        .with_clean(config.clean)
        .with_protected(config.protected_files()?))
}

/// Concrete source for one config entry
pub fn build_source(entry: &SourceEntry, config: &SyncConfig) -> Result<Box<dyn ClusterSource>> {
    let label = entry.label().to_string();
    let source: Box<dyn ClusterSource> = match &entry.kind {
        SourceKind::Local { dir } => Box::new(LocalSource::new(dir).with_name(label)),
        SourceKind::Git { repo, dir, branch } => {
            let mut exporter = GitExporter::new();
            if let Some(branch) = branch {
                exporter = exporter.with_branch(branch);
            }
            Box::new(VcsSource::new(exporter, repo, dir)?.with_name(label))
        }
        SourceKind::Svn { repo, dir } => {
            Box::new(VcsSource::new(SvnExporter::new(), repo, dir)?.with_name(label))
        }
        SourceKind::HttpIndex { url, filter, timeout_secs } => {
            let mut source = HttpIndexSource::new(url, filter)?.with_name(label);
            if let Some(secs) = timeout_secs {
                source = source.with_timeout(Duration::from_secs(*secs))?;
            }
            Box::new(source)
        }
        SourceKind::Version => Box::new(VersionSource::new()),
        SourceKind::ReverseIndex => {
            let client = RangeClient::connect(&config.range_client())?;
            Box::new(ReverseIndexSource::new(client))
        }
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_data;
    use crate::domain::ClusterValue;
    use tempfile::TempDir;

    struct StaticSource {
        name: &'static str,
        clusters: ClusterSet,
    }

    impl ClusterSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        fn read(&self) -> Result<ClusterSet> {
            Ok(self.clusters.clone())
        }
    }

    struct BrokenSource;

    impl ClusterSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        fn read(&self) -> Result<ClusterSet> {
            Err(SyncError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk on fire")))
        }
    }

    fn planned(name: &'static str, clusters: ClusterSet, policy: MergePolicy) -> PlannedSource {
        PlannedSource::new(Box::new(StaticSource { name, clusters }), policy)
    }

    #[test]
    fn test_sources_fold_in_order() {
        let mut base = ClusterSet::new();
        base.insert("web", cluster_data! { "CLUSTER" => "w1", "OWNER" => "web-team" });
        let mut patch = ClusterSet::new();
        patch.insert("web", cluster_data! { "CLUSTER" => "w2" });
        patch.insert("db", cluster_data! { "CLUSTER" => "d1" });
        let mut extra = ClusterSet::new();
        extra.insert("web", cluster_data! { "CLUSTER" => "ignored" });
        extra.insert("cache", cluster_data! { "CLUSTER" => "c1" });

        let out = TempDir::new().unwrap();
        let runner = SyncRunner::new(
            SyncWriter::new(out.path()),
            vec![
                planned("base", base, MergePolicy::Merge),
                planned("patch", patch, MergePolicy::Merge),
                planned("extra", extra, MergePolicy::NoMerge),
            ],
        );

        let clusters = runner.collect().unwrap();
        assert_eq!(clusters.names().collect::<Vec<_>>(), vec!["cache", "db", "web"]);
        let web = clusters.get("web").unwrap();
        assert_eq!(web["CLUSTER"], ClusterValue::from("w2"));
        assert_eq!(web["OWNER"], ClusterValue::from("web-team"));
    }

    #[test]
    fn test_failing_source_aborts_before_publish() {
        let out = TempDir::new().unwrap();
        std::fs::write(out.path().join("keep.yaml"), "CLUSTER: k\n").unwrap();

        let mut clusters = ClusterSet::new();
        clusters.insert("web", cluster_data! { "CLUSTER" => "w1" });
        let runner = SyncRunner::new(
            SyncWriter::new(out.path()),
            vec![
                planned("ok", clusters, MergePolicy::Merge),
                PlannedSource::new(Box::new(BrokenSource), MergePolicy::Merge),
            ],
        );

        let err = runner.run().unwrap_err();
        assert!(matches!(err, SyncError::Source { ref source_name, .. } if source_name == "broken"));
        assert!(out.path().join("keep.yaml").exists());
        assert!(!out.path().join("web.yaml").exists());
    }

    #[test]
    fn test_unsupported_format_rejected_up_front() {
        let mut config = SyncConfig::new("/tmp").with_source(SourceKind::Version, MergePolicy::Merge);
        config.output_format = "json".to_string();
        assert!(matches!(
            SyncRunner::from_config(&config).err().unwrap(),
            SyncError::UnsupportedFormat(_)
        ));
    }

    #[test]
    fn test_from_config_builds_sources() {
        let config = SyncConfig::new("/tmp")
            .with_source(SourceKind::Local { dir: "/tmp".into() }, MergePolicy::Merge)
            .with_source(
                SourceKind::Git {
                    repo: "https://git.example.com/r.git".into(),
                    dir: "range".into(),
                    branch: None,
                },
                MergePolicy::Override,
            )
            .with_source(SourceKind::Version, MergePolicy::Override);

        let runner = SyncRunner::from_config(&config).unwrap();
        let labels: Vec<&str> = runner.sources().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["local", "git", "version"]);
        assert_eq!(runner.sources()[1].policy, MergePolicy::Override);
    }
}
