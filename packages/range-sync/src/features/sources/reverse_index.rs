//! Synthetic reverse index: member → clusters containing it
//!
//! Built by querying the range server through the splitter, so clusters
//! with very large memberships still expand.

use crate::domain::{ClusterData, ClusterSet, ClusterSource, ClusterValue};
use crate::error::Result;
use range_client::{RangeClient, Transport};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

pub const INDEX_CLUSTER: &str = "index";
const ALL_CLUSTERS_EXPR: &str = "allclusters()";

pub struct ReverseIndexSource<T: Transport> {
    client: RangeClient<T>,
    cluster: String,
}

impl<T: Transport> ReverseIndexSource<T> {
    pub fn new(client: RangeClient<T>) -> Self {
        Self {
            client,
            cluster: INDEX_CLUSTER.to_string(),
        }
    }

    pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }
}

impl<T: Transport> ClusterSource for ReverseIndexSource<T> {
    fn name(&self) -> &str {
        "reverse_index"
    }

    fn read(&self) -> Result<ClusterSet> {
        let clusters = self.client.expand_members(ALL_CLUSTERS_EXPR)?;

        let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for cluster in &clusters {
            match self.client.expand_members(format!("%{}", cluster)) {
                Ok(members) => {
                    for member in members {
                        index.entry(member).or_default().insert(cluster.clone());
                    }
                }
                Err(e) => warn!(cluster = %cluster, error = %e, "could not look up cluster"),
            }
        }

        info!(clusters = clusters.len(), members = index.len(), "built reverse index");

        let data: ClusterData = index
            .into_iter()
            .map(|(member, owners)| (member, ClusterValue::sequence(owners)))
            .collect();

        let mut out = ClusterSet::new();
        out.insert(self.cluster.clone(), data);
        Ok(out)
    }
}
