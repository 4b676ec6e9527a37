//! Packaged chart archives
//!
//! A packaged chart is a `.tgz` whose entries live under a single top-level
//! directory named after the chart (`mychart/Chart.yaml`, `mychart/values.yaml`,
//! ...). Publishing needs the raw bytes plus the chart name and version.

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;

use crate::error::{CoreError, Result};

/// The part of `Chart.yaml` needed to address an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// Chart API version (`v1` or `v2`)
    #[serde(default)]
    pub api_version: Option<String>,

    /// Chart name
    pub name: String,

    /// Chart version (SemVer 2)
    pub version: semver::Version,

    #[serde(default)]
    pub app_version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl ChartMetadata {
    /// Parse `Chart.yaml` content
    pub fn parse(content: &str) -> Result<Self> {
        let metadata: Self = serde_yaml::from_str(content)?;
        if metadata.name.trim().is_empty() {
            return Err(CoreError::InvalidChart {
                message: "chart name must not be empty".to_string(),
            });
        }
        Ok(metadata)
    }
}

/// A packaged chart loaded into memory
#[derive(Debug, Clone)]
pub struct ChartArchive {
    /// Where the archive was read from, if it came from disk
    pub path: Option<PathBuf>,
    pub metadata: ChartMetadata,
    data: Vec<u8>,
}

impl ChartArchive {
    /// Load a chart archive from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ArchiveNotFound {
                path: path.display().to_string(),
            });
        }

        let data = std::fs::read(path)?;
        let mut archive = Self::from_bytes(data)?;
        archive.path = Some(path.to_path_buf());
        Ok(archive)
    }

    /// Build from in-memory archive bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let chart_yaml = read_chart_yaml(&data)?;
        let metadata = ChartMetadata::parse(&chart_yaml)?;

        Ok(Self {
            path: None,
            metadata,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Chart version as a string, the form used in upload requests
    pub fn version(&self) -> String {
        self.metadata.version.to_string()
    }

    /// Raw archive bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// SHA256 digest of the archive bytes, hex encoded
    pub fn digest(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&self.data);
        hex::encode(hasher.finalize())
    }
}

/// Find the top-level `Chart.yaml` (`<chart>/Chart.yaml`) and return its content.
///
/// Subchart manifests (`<chart>/charts/<sub>/Chart.yaml`) are skipped.
fn read_chart_yaml(data: &[u8]) -> Result<String> {
    let decoder = GzDecoder::new(std::io::Cursor::new(data));
    let mut archive = Archive::new(decoder);

    let entries = archive.entries().map_err(|e| CoreError::Archive {
        message: format!("not a gzipped tar archive: {}", e),
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|e| CoreError::Archive {
            message: e.to_string(),
        })?;
        let path = entry.path()?.to_string_lossy().to_string();

        if is_top_level_chart_yaml(&path) {
            let mut content = String::new();
            entry
                .read_to_string(&mut content)
                .map_err(|e| CoreError::Archive {
                    message: format!("Invalid UTF-8 in {}: {}", path, e),
                })?;
            return Ok(content);
        }
    }

    Err(CoreError::Archive {
        message: "Chart.yaml not found in archive".to_string(),
    })
}

fn is_top_level_chart_yaml(path: &str) -> bool {
    let parts: Vec<&str> = path
        .trim_start_matches("./")
        .split('/')
        .filter(|p| !p.is_empty())
        .collect();
    parts.len() == 2 && parts[1] == "Chart.yaml"
}

/// Conventional file name of a packaged chart (`<name>-<version>.tgz`)
#[must_use]
pub fn default_archive_name(name: &str, version: &str) -> String {
    format!("{}-{}.tgz", name, version)
}
