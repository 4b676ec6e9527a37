//! Publishing configuration file
//!
//! Stored in `~/.config/chartpush/publishing.yaml`. Entries are plain data;
//! [`PublishingConfig::to_repositories`] turns them into live
//! [`PublishingRepository`] values, deferring anything that reads the
//! environment until a snapshot is taken.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::Credentials;
use crate::error::{RepoError, Result};
use crate::repository::{PublishingRepositories, PublishingRepository, RepositoryFlavor};

/// Publishing configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishingConfig {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Configured publish targets
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

fn default_api_version() -> String {
    "chartpush.io/v1".to_string()
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            repositories: Vec::new(),
        }
    }
}

impl PublishingConfig {
    /// Load configuration from default location
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to default location
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    ///
    /// The file may hold credentials, so on Unix it is only readable by the
    /// owner.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut options = std::fs::OpenOptions::new();
            options.write(true).create(true).truncate(true).mode(0o600);
            std::io::Write::write_all(&mut options.open(path)?, content.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(path, content)?;
        }

        Ok(())
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| RepoError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("chartpush").join("publishing.yaml"))
    }

    /// Get an entry by name
    pub fn get(&self, name: &str) -> Option<&RepositoryEntry> {
        self.repositories.iter().find(|r| r.name == name)
    }

    /// Add an entry
    pub fn add(&mut self, entry: RepositoryEntry) -> Result<()> {
        if self.get(&entry.name).is_some() {
            return Err(RepoError::RepositoryAlreadyExists {
                name: entry.name.clone(),
            });
        }
        self.repositories.push(entry);
        Ok(())
    }

    /// Remove an entry by name
    pub fn remove(&mut self, name: &str) -> Result<RepositoryEntry> {
        let idx = self
            .repositories
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| RepoError::RepositoryNotFound {
                name: name.to_string(),
            })?;
        Ok(self.repositories.remove(idx))
    }

    /// List all entry names
    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }

    /// Build the live repositories described by this file
    pub fn to_repositories(&self) -> Result<PublishingRepositories> {
        let mut repos = PublishingRepositories::new();
        for entry in &self.repositories {
            repos.add(entry.to_repository())?;
        }
        Ok(repos)
    }
}

/// One publish target as written in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    /// Unique name for this repository
    pub name: String,

    #[serde(default)]
    pub flavor: RepositoryFlavor,

    /// Repository URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Environment variable holding the URL, read at publish time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_env: Option<String>,

    /// ChartMuseum tenant ids, one per `--depth` level
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tenant_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,

    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,
}

impl RepositoryEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flavor: RepositoryFlavor::default(),
            url: Some(url.into()),
            url_env: None,
            tenant_ids: Vec::new(),
            credentials: None,
            timeout: None,
        }
    }

    /// Live repository for this entry
    ///
    /// A literal `url` wins over `urlEnv`.
    pub fn to_repository(&self) -> PublishingRepository {
        let mut repo = PublishingRepository::new(&self.name, self.flavor);

        if let Some(url) = &self.url {
            repo.url.set(url.clone());
        } else if let Some(var) = &self.url_env {
            let var = var.clone();
            repo.url.set_deferred(move || std::env::var(&var).ok());
        }

        repo.tenant_ids.set(self.tenant_ids.iter().cloned());

        if let Some(creds) = &self.credentials {
            repo.set_credentials(creds.clone());
        }

        repo.timeout = self.timeout;
        repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::ResolvedCredentials;
    use crate::publisher::PublisherParams;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
apiVersion: chartpush.io/v1
repositories:
  - name: internal
    url: https://charts.example.com
    tenantIds: [acme, team-x]
    credentials:
      type: basic
      username: ci
      password: secret
    timeout: 30s
  - name: releases
    flavor: artifactory
    url: https://artifactory.example.com/artifactory/helm-local
"#;

    #[test]
    fn test_parse_sample() {
        let config: PublishingConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.names(), vec!["internal", "releases"]);

        let internal = config.get("internal").unwrap();
        assert_eq!(internal.flavor, RepositoryFlavor::ChartMuseum);
        assert_eq!(internal.tenant_ids, vec!["acme", "team-x"]);
        assert_eq!(internal.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            internal.credentials,
            Some(Credentials::basic("ci", "secret"))
        );

        assert_eq!(
            config.get("releases").unwrap().flavor,
            RepositoryFlavor::Artifactory
        );
    }

    #[test]
    fn test_to_repositories_snapshot() {
        let config: PublishingConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let repos = config.to_repositories().unwrap();

        let PublisherParams::ChartMuseum(params) = repos.publisher_params("internal").unwrap()
        else {
            panic!("expected chartmuseum params");
        };
        assert_eq!(params.tenant_ids, vec!["acme", "team-x"]);
        assert_eq!(params.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            params.credentials,
            Some(ResolvedCredentials::Basic {
                username: "ci".to_string(),
                password: "secret".to_string(),
            })
        );

        assert!(matches!(
            repos.publisher_params("releases").unwrap(),
            PublisherParams::Artifactory(_)
        ));
    }

    #[test]
    fn test_url_env_is_deferred() {
        let mut entry = RepositoryEntry::new("ci", "unused");
        entry.url = None;
        entry.url_env = Some("CHARTPUSH_TEST_REPO_URL".to_string());

        let repo = entry.to_repository();
        assert!(matches!(
            repo.publisher_params().unwrap_err(),
            RepoError::IncompleteRepository { .. }
        ));

        // SAFETY: the variable name is unique to this test
        unsafe { std::env::set_var("CHARTPUSH_TEST_REPO_URL", "https://ci.example.com") };
        assert_eq!(
            repo.publisher_params().unwrap().url().as_str(),
            "https://ci.example.com/"
        );
        // SAFETY: see above
        unsafe { std::env::remove_var("CHARTPUSH_TEST_REPO_URL") };
    }

    #[test]
    fn test_add_remove() {
        let mut config = PublishingConfig::default();
        config
            .add(RepositoryEntry::new("test", "https://example.com"))
            .unwrap();

        assert!(config.get("test").is_some());
        assert!(config
            .add(RepositoryEntry::new("test", "https://other.com"))
            .is_err());

        let removed = config.remove("test").unwrap();
        assert_eq!(removed.name, "test");
        assert!(config.get("test").is_none());
        assert!(config.remove("test").is_err());
    }

    #[test]
    fn test_duplicate_entries_rejected_when_building() {
        let config = PublishingConfig {
            repositories: vec![
                RepositoryEntry::new("dup", "https://a.example.com"),
                RepositoryEntry::new("dup", "https://b.example.com"),
            ],
            ..Default::default()
        };
        assert!(matches!(
            config.to_repositories(),
            Err(RepoError::RepositoryAlreadyExists { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("publishing.yaml");

        let mut config = PublishingConfig::default();
        let mut entry = RepositoryEntry::new("internal", "https://charts.example.com");
        entry.tenant_ids = vec!["acme".to_string()];
        entry.credentials = Some(Credentials::from_env("CM_USER", "CM_PASS"));
        entry.timeout = Some(Duration::from_secs(90));
        config.add(entry).unwrap();

        config.save_to(&path).unwrap();
        let loaded = PublishingConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let yaml = std::fs::read_to_string(&path).unwrap();
        assert!(yaml.contains("tenantIds"));
        assert!(yaml.contains("usernameVar: CM_USER"));
        assert!(!yaml.contains("urlEnv"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
