//! Cluster data model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Reserved key every published cluster carries
pub const CLUSTER_KEY: &str = "CLUSTER";

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    /// Integers above `i64::MAX`
    Unsigned(u64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Unsigned(u) => write!(f, "{}", u),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<u64> for Scalar {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(Scalar::Unsigned(u), Scalar::Integer)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// Attribute value: one scalar or an ordered list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClusterValue {
    Sequence(Vec<Scalar>),
    Scalar(Scalar),
}

impl ClusterValue {
    pub fn empty() -> Self {
        ClusterValue::Scalar(Scalar::String(String::new()))
    }

    pub fn sequence<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        ClusterValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<Scalar> for ClusterValue {
    fn from(value: Scalar) -> Self {
        ClusterValue::Scalar(value)
    }
}

impl From<&str> for ClusterValue {
    fn from(value: &str) -> Self {
        ClusterValue::Scalar(value.into())
    }
}

impl From<String> for ClusterValue {
    fn from(value: String) -> Self {
        ClusterValue::Scalar(value.into())
    }
}

impl From<i64> for ClusterValue {
    fn from(value: i64) -> Self {
        ClusterValue::Scalar(value.into())
    }
}

impl From<bool> for ClusterValue {
    fn from(value: bool) -> Self {
        ClusterValue::Scalar(value.into())
    }
}

impl From<Vec<Scalar>> for ClusterValue {
    fn from(items: Vec<Scalar>) -> Self {
        ClusterValue::Sequence(items)
    }
}

/// Key → value mapping of one cluster. Keys are case-sensitive.
pub type ClusterData = BTreeMap<String, ClusterValue>;

/// Cluster name → data. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterSet {
    clusters: BTreeMap<String, ClusterData>,
}

impl ClusterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: ClusterData) -> Option<ClusterData> {
        self.clusters.insert(name.into(), data)
    }

    pub fn get(&self, name: &str) -> Option<&ClusterData> {
        self.clusters.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ClusterData> {
        self.clusters.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clusters.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ClusterData> {
        self.clusters.remove(name)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clusters.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ClusterData)> {
        self.clusters.iter()
    }
}

impl IntoIterator for ClusterSet {
    type Item = (String, ClusterData);
    type IntoIter = std::collections::btree_map::IntoIter<String, ClusterData>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.into_iter()
    }
}

impl FromIterator<(String, ClusterData)> for ClusterSet {
    fn from_iter<I: IntoIterator<Item = (String, ClusterData)>>(iter: I) -> Self {
        Self {
            clusters: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, ClusterData)> for ClusterSet {
    fn extend<I: IntoIterator<Item = (String, ClusterData)>>(&mut self, iter: I) {
        self.clusters.extend(iter);
    }
}

/// How an added cluster set is reconciled with the main one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Key-level union, added keys win
    #[default]
    Merge,
    /// Added clusters replace same-named clusters wholesale
    Override,
    /// Only clusters absent from main; yields the new clusters alone
    #[serde(rename = "nomerge")]
    NoMerge,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::Merge => "merge",
            MergePolicy::Override => "override",
            MergePolicy::NoMerge => "nomerge",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(MergePolicy::Merge),
            "override" => Ok(MergePolicy::Override),
            "nomerge" | "no_merge" => Ok(MergePolicy::NoMerge),
            other => Err(format!(
                "Unknown merge policy '{}'. Valid policies: merge, override, nomerge",
                other
            )),
        }
    }
}

/// Convenience for building cluster data in code and tests
#[macro_export]
macro_rules! cluster_data {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut data = $crate::domain::ClusterData::new();
        $( data.insert($key.to_string(), $crate::domain::ClusterValue::from($value)); )*
        data
    }};
}
