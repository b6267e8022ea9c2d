//! Source readers
//!
//! Every source yields a [`ClusterSet`](crate::domain::ClusterSet). Sources
//! that fetch remote content stage it into a private temporary directory and
//! hand that directory to a [`ClusterFileParser`](crate::domain::ClusterFileParser);
//! the directory is removed when the read returns, whatever the outcome.

pub mod http_index;
pub mod local;
pub mod reverse_index;
pub mod vcs;
pub mod version;

pub use http_index::HttpIndexSource;
pub use local::{LocalSource, YamlDirectoryParser, CLUSTER_FILE_EXTENSION};
pub use reverse_index::ReverseIndexSource;
pub use vcs::{GitExporter, SvnExporter, VcsExporter, VcsSource};
pub use version::VersionSource;

use crate::error::Result;
use tempfile::TempDir;

/// Fresh, uniquely named staging directory; removed on drop
pub(crate) fn staging_dir(prefix: &str) -> Result<TempDir> {
    Ok(tempfile::Builder::new().prefix(prefix).tempdir()?)
}
