//! chartpush core - packaged chart archives
//!
//! This crate provides the types the publishing pipeline needs from a
//! packaged chart:
//! - `ChartArchive`: the archive bytes plus the name and version read from
//!   its `Chart.yaml`
//! - `ChartMetadata`: the subset of `Chart.yaml` used to address an upload

pub mod archive;
pub mod error;

pub use archive::{ChartArchive, ChartMetadata, default_archive_name};
pub use error::{CoreError, Result};
