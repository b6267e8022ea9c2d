//! Sync writer: publish a cluster set into the directory the range server
//! reads, one atomically replaced file per cluster
//!
//! Each file's replacement is atomic; the directory as a whole is not. A crash
//! mid-publish can leave some clusters at the new generation and others at the
//! old one, but never a file mixing both.

pub mod atomic;
pub mod protect;
pub mod writer;

pub use atomic::{atomic_copy, hidden_temp_name, HIDDEN_TEMP_SUFFIX};
pub use protect::ProtectedFiles;
pub use writer::{publish, OutputFormat, PublishReport, SyncWriter};
