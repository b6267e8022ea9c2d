//! Sync configuration (YAML)
//!
//! ```yaml
//! output_dir: /etc/range
//! clean: true
//! protected:
//!   - ^version\.yaml$
//! range:
//!   host: range.example.com:80
//! sources:
//!   - type: git
//!     repo: https://git.example.com/ops/clusters.git
//!     dir: range
//!   - type: http_index
//!     url: http://admin.example.com/range/
//!     filter: \.yaml$
//!     policy: nomerge
//!   - type: version
//!     policy: override
//! ```

pub mod error;

pub use error::{ConfigError, ConfigResult};

use crate::domain::MergePolicy;
use crate::features::publish::ProtectedFiles;
use range_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_output_format() -> String {
    "yaml".to_string()
}

fn default_clean() -> bool {
    true
}

/// One sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Directory the range server reads
    pub output_dir: PathBuf,

    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Delete output files whose cluster disappeared from every source
    #[serde(default = "default_clean")]
    pub clean: bool,

    /// Regexes for output files cleanup must keep
    #[serde(default)]
    pub protected: Vec<String>,

    /// Range server used by the reverse-index source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ClientConfig>,

    /// Applied in order, each folded into the accumulated set with its policy
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// A source plus how it merges into what came before it.
///
/// Keys a source type does not know are rejected rather than ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_yaml::Mapping")]
pub struct SourceEntry {
    #[serde(default)]
    pub policy: MergePolicy,

    /// Label for logs; defaults to the source type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub kind: SourceKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceKind {
    Local {
        dir: PathBuf,
    },
    Git {
        repo: String,
        #[serde(default)]
        dir: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },
    Svn {
        repo: String,
        #[serde(default)]
        dir: PathBuf,
    },
    HttpIndex {
        url: String,
        filter: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_secs: Option<u64>,
    },
    Version,
    ReverseIndex,
}

impl SourceKind {
    /// Keys this source type accepts besides `type`, `policy` and `name`
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            SourceKind::Local { .. } => &["dir"],
            SourceKind::Git { .. } => &["repo", "dir", "branch"],
            SourceKind::Svn { .. } => &["repo", "dir"],
            SourceKind::HttpIndex { .. } => &["url", "filter", "timeout_secs"],
            SourceKind::Version | SourceKind::ReverseIndex => &[],
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SourceKind::Local { .. } => "local",
            SourceKind::Git { .. } => "git",
            SourceKind::Svn { .. } => "svn",
            SourceKind::HttpIndex { .. } => "http_index",
            SourceKind::Version => "version",
            SourceKind::ReverseIndex => "reverse_index",
        }
    }
}

impl TryFrom<serde_yaml::Mapping> for SourceEntry {
    type Error = String;

    fn try_from(mut raw: serde_yaml::Mapping) -> Result<Self, Self::Error> {
        let policy = match raw.remove("policy") {
            Some(value) => serde_yaml::from_value(value).map_err(|e| format!("invalid policy: {}", e))?,
            None => MergePolicy::default(),
        };
        let name = match raw.remove("name") {
            Some(value) => {
                Some(serde_yaml::from_value(value).map_err(|e| format!("invalid name: {}", e))?)
            }
            None => None,
        };

        let kind: SourceKind =
            serde_yaml::from_value(serde_yaml::Value::Mapping(raw.clone())).map_err(|e| e.to_string())?;

        let allowed = kind.field_names();
        for key in raw.keys() {
            let known = key
                .as_str()
                .map_or(false, |k| k == "type" || allowed.contains(&k));
            if !known {
                return Err(format!(
                    "unknown field {:?} for {} source, expected one of: type, policy, name, {}",
                    key,
                    kind.type_name(),
                    allowed.join(", ")
                ));
            }
        }

        Ok(Self { policy, name, kind })
    }
}

impl SourceEntry {
    pub fn new(kind: SourceKind, policy: MergePolicy) -> Self {
        Self {
            policy,
            name: None,
            kind,
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.kind.type_name())
    }
}

impl SyncConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            output_format: default_output_format(),
            clean: default_clean(),
            protected: Vec::new(),
            range: None,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, kind: SourceKind, policy: MergePolicy) -> Self {
        self.sources.push(SourceEntry::new(kind, policy));
        self
    }

    pub fn with_protected(mut self, pattern: impl Into<String>) -> Self {
        self.protected.push(pattern.into());
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_range(mut self, range: ClientConfig) -> Self {
        self.range = Some(range);
        self
    }

    /// Load and validate
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: SyncConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn protected_files(&self) -> ConfigResult<ProtectedFiles> {
        ProtectedFiles::new(&self.protected)
    }

    /// Range client settings, defaulting to `localhost:80`
    pub fn range_client(&self) -> ClientConfig {
        self.range.clone().unwrap_or_default()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("no sources configured".to_string()));
        }

        self.protected_files()?;

        for entry in &self.sources {
            if let SourceKind::HttpIndex { filter, .. } = &entry.kind {
                regex::Regex::new(filter).map_err(|e| ConfigError::InvalidPattern {
                    pattern: filter.clone(),
                    message: e.to_string(),
                })?;
            }
        }
        Ok(())
    }
}
