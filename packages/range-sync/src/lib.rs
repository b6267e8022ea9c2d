//! range-sync: gather cluster definitions and publish them for the range server
//!
//! ## Architecture
//!
//! ```text
//! sources (local / git / svn / http index / version / reverse index)
//!     ↓ read, one ClusterSet each
//! merge (merge / override / nomerge, in config order)
//!     ↓
//! normalize + render (one YAML file per cluster)
//!     ↓
//! publish (hidden temp + rename, stale cleanup with protected files)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use range_sync::{SyncConfig, SyncRunner};
//!
//! let config = SyncConfig::from_yaml("/etc/range-sync.yaml")?;
//! let outcome = SyncRunner::from_config(&config)?.run()?;
//! println!("published {} clusters", outcome.clusters);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod pipeline;

pub use config::{ConfigError, SourceEntry, SourceKind, SyncConfig};
pub use domain::{ClusterData, ClusterSet, ClusterSource, ClusterValue, MergePolicy, Scalar};
pub use error::{Result, SyncError};
pub use features::merge::{fold, merge};
pub use features::normalize::{normalize, normalize_key, normalize_string};
pub use features::publish::{publish, OutputFormat, ProtectedFiles, PublishReport, SyncWriter};
pub use pipeline::{PlannedSource, SyncOutcome, SyncRunner};
