//! Full runs: YAML config → sources → merge → publish

mod common;

use common::{list_dir, read_yaml, serve_static, write_files};
use pretty_assertions::assert_eq;
use range_sync::{SyncConfig, SyncError, SyncRunner};
use std::path::PathBuf;
use tempfile::TempDir;

struct Layout {
    root: TempDir,
}

impl Layout {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        write_files(
            &root.path().join("base"),
            &[
                ("web.yaml", "CLUSTER: web1\nOWNER: web-team\n"),
                ("db.yaml", "CLUSTER: db1\n"),
            ],
        );
        write_files(&root.path().join("patch"), &[("db.yaml", "OWNER: dba\n")]);
        write_files(&root.path().join("overlay"), &[("web.yaml", "CLUSTER: web9\n")]);
        write_files(
            &root.path().join("extras"),
            &[("web.yaml", "CLUSTER: ignored\n"), ("cache.yaml", "CLUSTER: c1\n")],
        );
        write_files(
            &root.path().join("out"),
            &[
                ("version.yaml", "CLUSTER: 1\n"),
                ("retired.yaml", "CLUSTER: old\n"),
            ],
        );
        Self { root }
    }

    fn path(&self, name: &str) -> String {
        self.root.path().join(name).display().to_string()
    }

    fn out_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    fn config(&self, extra_sources: &str) -> SyncConfig {
        let yaml = format!(
            r#"
output_dir: '{out}'
protected:
  - ^version\.yaml$
sources:
  - type: local
    name: base
    dir: '{base}'
  - type: local
    name: patch
    dir: '{patch}'
    policy: merge
  - type: local
    name: overlay
    dir: '{overlay}'
    policy: override
  - type: local
    name: extras
    dir: '{extras}'
    policy: nomerge
{extra_sources}"#,
            out = self.path("out"),
            base = self.path("base"),
            patch = self.path("patch"),
            overlay = self.path("overlay"),
            extras = self.path("extras"),
            extra_sources = extra_sources,
        );
        let config = SyncConfig::from_yaml_str(&yaml).unwrap();
        config.validate().unwrap();
        config
    }
}

#[test]
fn test_run_merges_sources_and_cleans_output() {
    let layout = Layout::new();
    let outcome = SyncRunner::from_config(&layout.config("")).unwrap().run().unwrap();
    let out = layout.out_dir();

    assert_eq!(outcome.clusters, 3);
    assert!(outcome.report.is_clean());
    assert_eq!(outcome.report.deleted, vec!["retired.yaml"]);
    assert_eq!(outcome.report.protected, vec!["version.yaml"]);
    assert_eq!(list_dir(&out), vec!["cache.yaml", "db.yaml", "version.yaml", "web.yaml"]);

    let web = read_yaml(&out.join("web.yaml"));
    assert_eq!(web["CLUSTER"].as_str(), Some("web9"));
    assert!(web.get("OWNER").is_none());

    let db = read_yaml(&out.join("db.yaml"));
    assert_eq!(db["CLUSTER"].as_str(), Some("db1"));
    assert_eq!(db["OWNER"].as_str(), Some("dba"));

    assert_eq!(read_yaml(&out.join("cache.yaml"))["CLUSTER"].as_str(), Some("c1"));
}

#[test]
fn test_version_and_reverse_index_sources() {
    let range = serve_static(&[
        ("/range/list?allclusters%28%29", "web\ndb\n"),
        ("/range/list?%25web", "host1\nhost2\n"),
        ("/range/list?%25db", "host2\n"),
    ]);
    let layout = Layout::new();
    let extra = format!(
        "  - type: reverse_index\n  - type: version\n    policy: override\nrange:\n  host: '{}'\n  timeout_secs: 5\n",
        range.addr
    );

    let outcome = SyncRunner::from_config(&layout.config(&extra)).unwrap().run().unwrap();
    let out = layout.out_dir();

    assert_eq!(outcome.clusters, 5);
    assert!(outcome.report.protected.is_empty());

    let index = read_yaml(&out.join("index.yaml"));
    assert_eq!(index["host1"][0].as_str(), Some("web"));
    assert_eq!(index["host2"].as_sequence().unwrap().len(), 2);
    assert_eq!(index["CLUSTER"].as_str(), Some(""));

    let version = read_yaml(&out.join("version.yaml"));
    assert!(version["CLUSTER"].as_i64().unwrap() > 1);
    assert_eq!(version["CLUSTER"], version["UPDATE"]);
}

#[test]
fn test_dry_run_collects_without_writing() {
    let layout = Layout::new();
    let runner = SyncRunner::from_config(&layout.config("")).unwrap();

    let clusters = runner.collect().unwrap();

    assert_eq!(clusters.names().collect::<Vec<_>>(), vec!["cache", "db", "web"]);
    assert_eq!(
        list_dir(&layout.out_dir()),
        vec!["retired.yaml", "version.yaml"]
    );
}

#[test]
fn test_missing_source_aborts_run() {
    let layout = Layout::new();
    let extra = format!("  - type: local\n    name: gone\n    dir: '{}'\n", layout.path("gone"));

    let err = SyncRunner::from_config(&layout.config(&extra)).unwrap().run().unwrap_err();

    assert!(matches!(err, SyncError::Source { ref source_name, .. } if source_name == "gone"));
    assert_eq!(
        list_dir(&layout.out_dir()),
        vec!["retired.yaml", "version.yaml"]
    );
}
