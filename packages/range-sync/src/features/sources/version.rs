//! Synthetic `version` cluster stamped with the sync time

use crate::domain::{ClusterData, ClusterSet, ClusterSource, ClusterValue};
use crate::error::Result;

pub const VERSION_CLUSTER: &str = "version";

pub struct VersionSource {
    cluster: String,
    timestamp: Option<i64>,
}

impl Default for VersionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionSource {
    pub fn new() -> Self {
        Self {
            cluster: VERSION_CLUSTER.to_string(),
            timestamp: None,
        }
    }

    /// Pin the stamp instead of reading the clock
    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::new()
        }
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }
}

impl ClusterSource for VersionSource {
    fn name(&self) -> &str {
        "version"
    }

    fn read(&self) -> Result<ClusterSet> {
        let now = self.timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());

        let mut data = ClusterData::new();
        data.insert("CLUSTER".to_string(), ClusterValue::from(now));
        data.insert("UPDATE".to_string(), ClusterValue::from(now));

        let mut clusters = ClusterSet::new();
        clusters.insert(self.cluster.clone(), data);
        Ok(clusters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_stamp() {
        let clusters = VersionSource::at(1_700_000_000).read().unwrap();
        let data = clusters.get("version").unwrap();
        assert_eq!(data["CLUSTER"], ClusterValue::from(1_700_000_000i64));
        assert_eq!(data["UPDATE"], ClusterValue::from(1_700_000_000i64));
    }

    #[test]
    fn test_clock_stamp_is_recent() {
        let before = chrono::Utc::now().timestamp();
        let clusters = VersionSource::new().read().unwrap();
        match &clusters.get("version").unwrap()["UPDATE"] {
            ClusterValue::Scalar(crate::domain::Scalar::Integer(ts)) => assert!(*ts >= before),
            other => panic!("unexpected stamp {:?}", other),
        }
    }
}
