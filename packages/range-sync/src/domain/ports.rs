//! Ports - seams between the sync engine and where cluster data comes from
//!
//! Staging sources (vcs, http index) depend on [`ClusterFileParser`] rather
//! than on the local reader directly.

use super::models::ClusterSet;
use crate::error::Result;
use std::path::Path;

/// One upstream origin of cluster definitions
pub trait ClusterSource: Send + Sync {
    /// Short label for logs and errors
    fn name(&self) -> &str;

    /// Produce this source's clusters. Cleans up any staging it created.
    fn read(&self) -> Result<ClusterSet>;
}

/// Turns a directory of per-cluster files into a [`ClusterSet`]
pub trait ClusterFileParser: Send + Sync {
    fn parse_dir(&self, dir: &Path) -> Result<ClusterSet>;
}

impl<P: ClusterFileParser + ?Sized> ClusterFileParser for std::sync::Arc<P> {
    fn parse_dir(&self, dir: &Path) -> Result<ClusterSet> {
        (**self).parse_dir(dir)
    }
}

impl<S: ClusterSource + ?Sized> ClusterSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self) -> Result<ClusterSet> {
        (**self).read()
    }
}
