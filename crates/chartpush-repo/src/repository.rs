//! Publishing repositories
//!
//! A [`PublishingRepository`] is the live, mutable configuration of one
//! publish target. It is filled in during setup and read exactly when
//! [`PublishingRepository::publisher_params`] is called; everything after
//! that works from the returned snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::artifactory::ArtifactoryParams;
use crate::chartmuseum::ChartMuseumParams;
use crate::credentials::Credentials;
use crate::error::{RepoError, Result};
use crate::property::{ListProperty, Property};
use crate::publisher::PublisherParams;

/// Kind of server a repository points at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryFlavor {
    /// ChartMuseum API (`POST /api[/tenant...]/charts`)
    #[default]
    ChartMuseum,

    /// Artifactory Helm repository (`PUT /<name>-<version>.tgz`)
    Artifactory,
}

impl fmt::Display for RepositoryFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryFlavor::ChartMuseum => f.write_str("chartmuseum"),
            RepositoryFlavor::Artifactory => f.write_str("artifactory"),
        }
    }
}

impl std::str::FromStr for RepositoryFlavor {
    type Err = RepoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chartmuseum" => Ok(RepositoryFlavor::ChartMuseum),
            "artifactory" => Ok(RepositoryFlavor::Artifactory),
            other => Err(RepoError::InvalidConfig {
                message: format!(
                    "unknown repository flavor '{}' (expected chartmuseum or artifactory)",
                    other
                ),
            }),
        }
    }
}

/// One configured publish target
#[derive(Debug, Clone)]
pub struct PublishingRepository {
    name: String,
    flavor: RepositoryFlavor,

    /// Repository URL (absolute http or https)
    pub url: Property<String>,

    /// Tenant ids for a multitenant ChartMuseum server
    ///
    /// The length should equal the server's `--depth`. Empty, the default,
    /// matches a single-tenant server. Not used by other flavors.
    pub tenant_ids: ListProperty<String>,

    /// Per-request timeout; none by default
    pub timeout: Option<Duration>,

    credentials: Property<Credentials>,
}

impl PublishingRepository {
    pub fn new(name: impl Into<String>, flavor: RepositoryFlavor) -> Self {
        Self {
            name: name.into(),
            flavor,
            url: Property::default(),
            tenant_ids: ListProperty::empty(),
            timeout: None,
            credentials: Property::default(),
        }
    }

    /// Convenience constructor for a ChartMuseum repository
    pub fn chartmuseum(name: impl Into<String>) -> Self {
        Self::new(name, RepositoryFlavor::ChartMuseum)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flavor(&self) -> RepositoryFlavor {
        self.flavor
    }

    /// Configured credentials, not yet resolved
    pub fn credentials(&self) -> &Property<Credentials> {
        &self.credentials
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials.set(credentials);
    }

    /// Credentials decided when the snapshot is taken
    pub fn set_credentials_deferred<F>(&mut self, f: F)
    where
        F: Fn() -> Option<Credentials> + Send + Sync + 'static,
    {
        self.credentials.set_deferred(f);
    }

    pub fn clear_credentials(&mut self) {
        self.credentials.unset();
    }

    /// Snapshot the current configuration
    ///
    /// Reads every property now (running deferred ones) and returns values
    /// that no longer depend on this repository. Fails before any network
    /// activity when the URL is missing or not an absolute http(s) URL, or
    /// when credentials cannot be resolved.
    pub fn publisher_params(&self) -> Result<PublisherParams> {
        let url = self.resolve_url()?;
        let credentials = self
            .credentials
            .get()
            .map(|c| c.resolve())
            .transpose()?;

        tracing::debug!(
            repository = %self.name,
            flavor = %self.flavor,
            %url,
            authenticated = credentials.is_some(),
            "taking publisher snapshot"
        );

        let params: PublisherParams = match self.flavor {
            RepositoryFlavor::ChartMuseum => {
                ChartMuseumParams::new(url, self.tenant_ids.get(), credentials)
                    .with_timeout(self.timeout)
                    .into()
            }
            RepositoryFlavor::Artifactory => {
                let tenant_ids = self.tenant_ids.get();
                if !tenant_ids.is_empty() {
                    tracing::warn!(
                        repository = %self.name,
                        "tenant ids are ignored for artifactory repositories"
                    );
                }
                ArtifactoryParams::new(url, credentials)
                    .with_timeout(self.timeout)
                    .into()
            }
        };

        Ok(params)
    }

    fn resolve_url(&self) -> Result<Url> {
        let raw = self
            .url
            .get()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| RepoError::IncompleteRepository {
                name: self.name.clone(),
                field: "url".to_string(),
            })?;

        let url = Url::parse(raw.trim()).map_err(|e| RepoError::InvalidRepositoryUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(RepoError::InvalidRepositoryUrl {
                url: raw,
                reason: "URL must start with http:// or https://".to_string(),
            }),
        }
    }
}

/// Publish targets, unique by name, in insertion order
#[derive(Debug, Clone, Default)]
pub struct PublishingRepositories {
    repositories: Vec<PublishingRepository>,
}

impl PublishingRepositories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository and return it for configuration
    pub fn create(
        &mut self,
        name: &str,
        flavor: RepositoryFlavor,
    ) -> Result<&mut PublishingRepository> {
        if self.get(name).is_some() {
            return Err(RepoError::RepositoryAlreadyExists {
                name: name.to_string(),
            });
        }
        self.repositories.push(PublishingRepository::new(name, flavor));
        let idx = self.repositories.len() - 1;
        Ok(&mut self.repositories[idx])
    }

    /// Add an already-configured repository
    pub fn add(&mut self, repository: PublishingRepository) -> Result<()> {
        if self.get(repository.name()).is_some() {
            return Err(RepoError::RepositoryAlreadyExists {
                name: repository.name().to_string(),
            });
        }
        self.repositories.push(repository);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PublishingRepository> {
        self.repositories.iter().find(|r| r.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PublishingRepository> {
        self.repositories.iter_mut().find(|r| r.name == name)
    }

    /// Remove a repository by name
    pub fn remove(&mut self, name: &str) -> Result<PublishingRepository> {
        let idx = self
            .repositories
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| RepoError::RepositoryNotFound {
                name: name.to_string(),
            })?;
        Ok(self.repositories.remove(idx))
    }

    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublishingRepository> {
        self.repositories.iter()
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Snapshot a repository by name
    pub fn publisher_params(&self, name: &str) -> Result<PublisherParams> {
        self.get(name)
            .ok_or_else(|| RepoError::RepositoryNotFound {
                name: name.to_string(),
            })?
            .publisher_params()
    }
}
