//! Value normalization for the range grammar
//!
//! Range treats parentheses, whitespace and slashes specially. Values carrying
//! them are wrapped in the `q(...)` quoting form so the server reads them as
//! literals. Sequences stay ordered so output is deterministic.

use crate::domain::{ClusterData, ClusterSet, ClusterValue, Scalar};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static BAD_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s/]").expect("valid regex"));
static RANGE_MINUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S+ - \S+)+").expect("valid regex"));
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^q\(.*\)$").expect("valid regex"));
static PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[()]").expect("valid regex"));
static BAD_KEY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;\s]").expect("valid regex"));

/// Quote a single value if the range parser would misread it
pub fn normalize_string(value: &str) -> String {
    let mut value = value.to_string();

    if PARENS.is_match(&value) && !QUOTED.is_match(&value) {
        value = format!("q({})", value.replace('(', r"\(").replace(')', r"\)"));
    }

    if BAD_CHARS.is_match(&value) && !QUOTED.is_match(&value) && !RANGE_MINUS.is_match(&value) {
        value = format!("q({})", value);
    }

    value
}

/// Replace whitespace and `;` in key names with `_`
pub fn normalize_key(key: &str) -> String {
    BAD_KEY_CHARS.replace_all(key, "_").into_owned()
}

/// Only strings are rewritten; numbers, bools and nulls pass through
pub fn normalize_scalar(scalar: Scalar) -> Scalar {
    match scalar {
        Scalar::String(s) => Scalar::String(normalize_string(&s)),
        other => other,
    }
}

pub fn normalize_value(value: ClusterValue) -> ClusterValue {
    match value {
        ClusterValue::Scalar(scalar) => ClusterValue::Scalar(normalize_scalar(scalar)),
        ClusterValue::Sequence(items) => {
            ClusterValue::Sequence(items.into_iter().map(normalize_scalar).collect())
        }
    }
}

/// Normalize every key and value of one cluster
pub fn normalize(data: ClusterData) -> ClusterData {
    let mut out = ClusterData::new();
    for (key, value) in data {
        let key = normalize_key(&key);
        if out.insert(key.clone(), normalize_value(value)).is_some() {
            debug!(key = %key, "normalized key collided with an existing key");
        }
    }
    out
}

pub fn normalize_set(clusters: ClusterSet) -> ClusterSet {
    clusters
        .into_iter()
        .map(|(name, data)| (name, normalize(data)))
        .collect()
}
