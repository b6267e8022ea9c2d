//! HTTP index source: scrape a directory listing for links matching a
//! filter, download each into staging, parse the staging directory

use super::local::YamlDirectoryParser;
use super::staging_dir;
use crate::config::ConfigError;
use crate::domain::{ClusterFileParser, ClusterSet, ClusterSource};
use crate::error::{Result, SyncError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

static ANCHOR_HREF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("valid regex")
});

/// Link targets of every `<a href>` in `html` that match `filter`
pub fn extract_links(html: &str, filter: &Regex) -> BTreeSet<String> {
    ANCHOR_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_string())
        .filter(|href| filter.is_match(href))
        .collect()
}

/// Resource URL for a listing entry
pub fn resource_url(base: &str, file: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, file)
    } else {
        format!("{}/{}", base, file)
    }
}

/// Only plain file names may be written into staging
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

pub struct HttpIndexSource {
    name: String,
    url: String,
    filter: Regex,
    client: reqwest::blocking::Client,
    parser: Arc<dyn ClusterFileParser>,
}

impl HttpIndexSource {
    pub fn new(url: impl Into<String>, filter: &str) -> Result<Self> {
        let filter = Regex::new(filter).map_err(|e| ConfigError::InvalidPattern {
            pattern: filter.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name: "http_index".to_string(),
            url: url.into(),
            filter,
            client: reqwest::blocking::Client::new(),
            parser: Arc::new(YamlDirectoryParser),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::source_failed(&self.name, e))?;
        Ok(self)
    }

    pub fn with_parser(mut self, parser: Arc<dyn ClusterFileParser>) -> Self {
        self.parser = parser;
        self
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| SyncError::source_failed(&self.name, format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::source_failed(
                &self.name,
                format!("Got {} response code from {}", status.as_u16(), url),
            ));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| SyncError::source_failed(&self.name, format!("reading {} failed: {}", url, e)))
    }
}

impl ClusterSource for HttpIndexSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<ClusterSet> {
        let listing = self.fetch(&self.url)?;
        let files = extract_links(&String::from_utf8_lossy(&listing), &self.filter);
        debug!(url = %self.url, matches = files.len(), "scanned index page");

        let staging = staging_dir("range_sync_http-")?;
        for file in &files {
            if !is_plain_file_name(file) {
                warn!(href = %file, "skipping link that is not a plain file name");
                continue;
            }
            let content = self.fetch(&resource_url(&self.url, file))?;
            fs::write(staging.path().join(file), content)?;
        }

        let clusters = self
            .parser
            .parse_dir(staging.path())
            .map_err(|e| SyncError::source_failed(&self.name, e))?;

        info!(source = %self.name, url = %self.url, clusters = clusters.len(), "read http index source");
        Ok(clusters)
    }
}
