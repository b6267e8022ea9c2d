//! Single bounded-size query against the range HTTP endpoint
//!
//! `GET /range/list?<expr>` returns newline-delimited members,
//! `GET /range/expand?<expr>` returns the collapsed form. Logical failures are
//! reported with status 200 and a `RangeException` header.

use crate::config::ClientConfig;
use crate::error::{Result, TransportError};
use crate::user_agent::build_user_agent;
use tracing::debug;

/// Header the range server uses to report expression errors
pub const RANGE_EXCEPTION_HEADER: &str = "RangeException";

/// Which endpoint a query goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// One member per line
    List,
    /// Shortest equivalent expression
    Collapse,
}

impl QueryMode {
    pub fn path(&self) -> &'static str {
        match self {
            QueryMode::List => "/range/list",
            QueryMode::Collapse => "/range/expand",
        }
    }
}

/// Result of one transport round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionResult {
    /// Sorted members, trailing whitespace stripped
    List(Vec<String>),
    /// Raw collapsed body
    Collapsed(String),
}

impl ExpansionResult {
    pub fn into_list(self) -> Vec<String> {
        match self {
            ExpansionResult::List(members) => members,
            ExpansionResult::Collapsed(body) => parse_list_body(&body),
        }
    }

    pub fn into_collapsed(self) -> String {
        match self {
            ExpansionResult::List(members) => members.join(","),
            ExpansionResult::Collapsed(body) => body,
        }
    }
}

/// One request, no retries. Callers own retry and concurrency policy.
pub trait Transport: Send + Sync {
    fn query(&self, expression: &str, mode: QueryMode) -> Result<ExpansionResult>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn query(&self, expression: &str, mode: QueryMode) -> Result<ExpansionResult> {
        (**self).query(expression, mode)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn query(&self, expression: &str, mode: QueryMode) -> Result<ExpansionResult> {
        (**self).query(expression, mode)
    }
}

/// Blocking HTTP transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url();
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(build_user_agent(config.user_agent.as_deref()));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::connection(base_url.clone(), e))?;

        Ok(Self { client, base_url })
    }

    pub fn request_url(&self, expression: &str, mode: QueryMode) -> String {
        build_request_url(&self.base_url, expression, mode)
    }
}

impl Transport for HttpTransport {
    fn query(&self, expression: &str, mode: QueryMode) -> Result<ExpansionResult> {
        let url = self.request_url(expression, mode);
        debug!(url = %url, "range query");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| TransportError::connection(url.clone(), e))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(TransportError::bad_status(status, url));
        }

        if let Some(exception) = response.headers().get(RANGE_EXCEPTION_HEADER) {
            let message = String::from_utf8_lossy(exception.as_bytes()).into_owned();
            if !message.is_empty() {
                return Err(TransportError::server(message));
            }
        }

        let body = response.text().map_err(|e| TransportError::InvalidResponse {
            url: url.clone(),
            message: e.to_string(),
        })?;

        Ok(match mode {
            QueryMode::List => ExpansionResult::List(parse_list_body(&body)),
            QueryMode::Collapse => ExpansionResult::Collapsed(body),
        })
    }
}

pub fn build_request_url(base_url: &str, expression: &str, mode: QueryMode) -> String {
    format!(
        "{}{}?{}",
        base_url.trim_end_matches('/'),
        mode.path(),
        urlencoding::encode(expression)
    )
}

/// Newline-delimited members, each right-trimmed, sorted
pub fn parse_list_body(body: &str) -> Vec<String> {
    let mut members: Vec<String> = body.lines().map(|line| line.trim_end().to_string()).collect();
    members.sort();
    members
}
