//! Length-safe expansion and collapse
//!
//! Range queries are GETs, so the expression has to fit in a URL. Anything
//! longer than `max_chars` is cut at top-level commas into ordered chunks,
//! each sent on its own. Collapse repeats the split pass until the joined
//! output stops changing.

use crate::config::{ClientConfig, DEFAULT_MAX_CHARS, DEFAULT_MAX_COLLAPSE_ITERATIONS};
use crate::error::{Result, TransportError};
use crate::transport::{ExpansionResult, HttpTransport, QueryMode, Transport};
use tracing::{debug, warn};

/// A range expression, or several joined with commas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExpression(String);

impl RangeExpression {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RangeExpression {
    fn from(expr: &str) -> Self {
        RangeExpression(expr.to_string())
    }
}

impl From<String> for RangeExpression {
    fn from(expr: String) -> Self {
        RangeExpression(expr)
    }
}

impl From<&String> for RangeExpression {
    fn from(expr: &String) -> Self {
        RangeExpression(expr.clone())
    }
}

impl From<Vec<String>> for RangeExpression {
    fn from(items: Vec<String>) -> Self {
        RangeExpression(items.join(","))
    }
}

impl From<&[&str]> for RangeExpression {
    fn from(items: &[&str]) -> Self {
        RangeExpression(items.join(","))
    }
}

/// List-mode result: either one response or one group per chunk, in chunk order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListExpansion {
    Whole(Vec<String>),
    Chunked(Vec<Vec<String>>),
}

impl ListExpansion {
    pub fn chunk_count(&self) -> usize {
        match self {
            ListExpansion::Whole(_) => 1,
            ListExpansion::Chunked(groups) => groups.len(),
        }
    }

    pub fn into_groups(self) -> Vec<Vec<String>> {
        match self {
            ListExpansion::Whole(members) => vec![members],
            ListExpansion::Chunked(groups) => groups,
        }
    }

    /// All members across chunks, sorted, duplicates removed
    pub fn into_members(self) -> Vec<String> {
        let mut members: Vec<String> = self.into_groups().into_iter().flatten().collect();
        members.sort();
        members.dedup();
        members
    }
}

/// Partition `expr` into sorted comma-separated chunks, each at most
/// `max_chars` long when re-joined.
///
/// Every item costs its length plus one for the separator. An item that alone
/// exceeds the limit still gets a chunk of its own.
pub fn build_split_list(expr: &str, max_chars: usize) -> Vec<Vec<String>> {
    let mut items: Vec<&str> = expr.split(',').filter(|item| !item.is_empty()).collect();
    items.sort_unstable();

    let mut chunks: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut running_total = 0usize;

    for item in items {
        let cost = item.len() + 1;
        if !current.is_empty() && running_total + cost > max_chars {
            chunks.push(std::mem::take(&mut current));
            running_total = 0;
        }
        if cost > max_chars {
            warn!(item_len = item.len(), max_chars, "range item longer than request limit");
        }
        running_total += cost;
        current.push(item.to_string());
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Range client over any [`Transport`]
pub struct RangeClient<T: Transport = HttpTransport> {
    transport: T,
    max_chars: usize,
    max_collapse_iterations: usize,
}

impl RangeClient<HttpTransport> {
    /// HTTP-backed client for `config.host`
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> RangeClient<T> {
    pub fn with_transport(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            max_chars: config.max_chars.max(1),
            max_collapse_iterations: config.max_collapse_iterations.max(1),
        }
    }

    pub fn new(transport: T) -> Self {
        Self {
            transport,
            max_chars: DEFAULT_MAX_CHARS,
            max_collapse_iterations: DEFAULT_MAX_COLLAPSE_ITERATIONS,
        }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_split_list(&self, expr: &str) -> Vec<Vec<String>> {
        build_split_list(expr, self.max_chars)
    }

    /// Expand to members. Oversized expressions come back as one group per chunk.
    pub fn expand(&self, expr: impl Into<RangeExpression>) -> Result<ListExpansion> {
        let expr = expr.into();
        if expr.len() <= self.max_chars {
            let members = self.transport.query(expr.as_str(), QueryMode::List)?.into_list();
            return Ok(ListExpansion::Whole(members));
        }

        let groups = self
            .split_query(expr.as_str(), QueryMode::List)?
            .into_iter()
            .map(|result| result.into_list())
            .collect();
        Ok(ListExpansion::Chunked(groups))
    }

    /// Flattened, sorted members regardless of chunking
    pub fn expand_members(&self, expr: impl Into<RangeExpression>) -> Result<Vec<String>> {
        Ok(self.expand(expr)?.into_members())
    }

    /// Collapse to the shortest equivalent expression the server produces
    pub fn collapse(&self, expr: impl Into<RangeExpression>) -> Result<String> {
        let expr = expr.into();
        if expr.len() <= self.max_chars {
            return Ok(self
                .transport
                .query(expr.as_str(), QueryMode::Collapse)?
                .into_collapsed());
        }
        self.split_collapse(expr.as_str())
    }

    fn split_query(&self, expr: &str, mode: QueryMode) -> Result<Vec<ExpansionResult>> {
        let chunks = self.build_split_list(expr);
        debug!(chunks = chunks.len(), expr_len = expr.len(), ?mode, "splitting range query");

        chunks
            .iter()
            .map(|chunk| self.transport.query(&chunk.join(","), mode))
            .collect()
    }

    fn split_collapse(&self, expr: &str) -> Result<String> {
        let mut previous = String::new();
        let mut current = expr.to_string();
        let mut iterations = 0usize;

        while previous != current {
            if iterations >= self.max_collapse_iterations {
                return Err(TransportError::CollapseDiverged {
                    iterations,
                    last_len: current.len(),
                });
            }
            iterations += 1;

            let parts: Vec<String> = self
                .split_query(&current, QueryMode::Collapse)?
                .into_iter()
                .map(|result| result.into_collapsed().trim().to_string())
                .collect();
            let joined = parts.join(",").trim_matches(',').to_string();
            previous = std::mem::replace(&mut current, joined);
        }

        debug!(iterations, collapsed_len = current.len(), "split collapse converged");
        Ok(current)
    }
}
