//! CLI commands

pub mod publish;
pub mod repo;

use std::path::Path;

use crate::error::Result;
use chartpush_repo::PublishingConfig;

/// Load the publishing configuration, from `path` when given
pub(crate) fn load_config(path: Option<&Path>) -> Result<PublishingConfig> {
    match path {
        Some(path) if path.exists() => Ok(PublishingConfig::load_from(path)?),
        Some(_) => Ok(PublishingConfig::default()),
        None => Ok(PublishingConfig::load()?),
    }
}

/// Save the publishing configuration, to `path` when given
pub(crate) fn save_config(config: &PublishingConfig, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}
