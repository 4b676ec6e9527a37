//! chartpush publishing repositories
//!
//! This crate turns repository configuration into chart uploads:
//!
//! - **Repositories**: named, mutable publish targets whose values may be
//!   computed late ([`PublishingRepository`])
//! - **Snapshots**: [`PublisherParams`], a plain value taken from a repository
//!   at publish time, serializable and independent of its source
//! - **Publishers**: one [`ChartPublisher`] per server flavor, deciding the
//!   upload method and path
//! - **ChartMuseum multitenancy**: tenant ids become path segments,
//!   `/api/<org>/<team>/charts`
//!
//! ## Example
//!
//! ```rust,no_run
//! use chartpush_repo::{ChartPublisher, Credentials, PublishingRepository};
//!
//! # async fn example(archive: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let mut repo = PublishingRepository::chartmuseum("internal");
//! repo.url.set("https://charts.example.com");
//! repo.tenant_ids.add("acme");
//! repo.set_credentials(Credentials::from_env("CM_USER", "CM_PASS"));
//!
//! // Freeze the configuration, then upload from the snapshot
//! let params = repo.publisher_params()?;
//! let publisher = params.create_publisher();
//! publisher.publish("nginx", "1.2.3", archive).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod property;
pub mod credentials;
pub mod http;
pub mod publisher;
pub mod chartmuseum;
pub mod artifactory;
pub mod repository;
pub mod config;

// Re-exports for convenience
pub use error::{RepoError, Result};
pub use property::{ListProperty, Property};
pub use credentials::{Credentials, ResolvedCredentials};
pub use http::HttpChartPublisher;
pub use publisher::{ChartPublisher, PublisherParams};
pub use chartmuseum::{ChartMuseumParams, ChartMuseumPublisher};
pub use artifactory::{ArtifactoryParams, ArtifactoryPublisher};
pub use repository::{PublishingRepositories, PublishingRepository, RepositoryFlavor};
pub use config::{PublishingConfig, RepositoryEntry};
