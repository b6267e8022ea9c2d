//! Domain model: clusters, cluster sets, merge policies, and the seams
//! sources plug into.

pub mod models;
pub mod ports;

pub use models::{ClusterData, ClusterSet, ClusterValue, MergePolicy, Scalar, CLUSTER_KEY};
pub use ports::{ClusterFileParser, ClusterSource};
