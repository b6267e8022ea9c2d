//! range-client: query the range cluster-naming service
//!
//! ## Overview
//!
//! - [`Transport`]: one bounded GET against `/range/list` or `/range/expand`
//! - [`RangeClient`]: splits expressions that would overflow the URL limit,
//!   issues one request per chunk, and iterates collapse to a fixed point
//!
//! ## Usage
//!
//! ```rust,ignore
//! use range_client::{ClientConfig, RangeClient};
//!
//! let client = RangeClient::connect(&ClientConfig::new("range.example.com:80"))?;
//! let hosts = client.expand_members("%web-frontend")?;
//! let compact = client.collapse(hosts)?;
//! ```

pub mod config;
pub mod error;
pub mod splitter;
pub mod transport;
pub mod user_agent;

pub use config::ClientConfig;
pub use error::{Result, TransportError};
pub use splitter::{build_split_list, ListExpansion, RangeClient, RangeExpression};
pub use transport::{ExpansionResult, HttpTransport, QueryMode, Transport};
pub use user_agent::build_user_agent;
