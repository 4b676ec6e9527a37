//! Publishers and their snapshot parameters
//!
//! [`PublisherParams`] is what a configured repository turns into when a
//! publish is scheduled: resolved URL, credentials and flavor settings, with
//! no link back to the repository it came from. It serializes, so it can be
//! handed to another task or process and turned into a [`ChartPublisher`]
//! there.

use async_trait::async_trait;
use chartpush_core::ChartArchive;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::artifactory::{ArtifactoryParams, ArtifactoryPublisher};
use crate::chartmuseum::{ChartMuseumParams, ChartMuseumPublisher};
use crate::error::Result;
use crate::http::HttpChartPublisher;

/// Uploads charts to one repository
///
/// Each server flavor decides the request shape; the transfer itself is
/// shared through [`HttpChartPublisher`].
#[async_trait]
pub trait ChartPublisher: Send + Sync + fmt::Debug {
    /// HTTP method of the upload request
    fn upload_method(&self) -> Method;

    /// Request path, relative to the repository URL
    fn upload_path(&self, chart_name: &str, chart_version: &str) -> String;

    /// The HTTP client carrying URL and credentials
    fn transport(&self) -> &HttpChartPublisher;

    /// Upload an archive
    ///
    /// Errors from the server or the network are returned unchanged; there is
    /// no retry.
    async fn publish(&self, chart_name: &str, chart_version: &str, archive: &[u8]) -> Result<()> {
        let method = self.upload_method();
        let path = self.upload_path(chart_name, chart_version);
        self.transport()
            .upload(method, &path, chart_name, chart_version, archive)
            .await
    }

    /// Upload a loaded chart archive
    async fn publish_chart(&self, chart: &ChartArchive) -> Result<()> {
        self.publish(chart.name(), &chart.version(), chart.data())
            .await
    }
}

/// Resolved, transferable publisher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flavor", rename_all = "lowercase")]
pub enum PublisherParams {
    ChartMuseum(ChartMuseumParams),
    Artifactory(ArtifactoryParams),
}

impl PublisherParams {
    /// Build a new publisher from this snapshot
    ///
    /// Pure: every call returns an independent publisher with the same
    /// behavior.
    pub fn create_publisher(&self) -> Box<dyn ChartPublisher> {
        match self {
            PublisherParams::ChartMuseum(params) => Box::new(ChartMuseumPublisher::from(params)),
            PublisherParams::Artifactory(params) => Box::new(ArtifactoryPublisher::from(params)),
        }
    }

    /// Repository URL the publisher will upload to
    pub fn url(&self) -> &url::Url {
        match self {
            PublisherParams::ChartMuseum(params) => &params.url,
            PublisherParams::Artifactory(params) => &params.url,
        }
    }

    /// Flavor name, as used in configuration files
    pub fn flavor(&self) -> &'static str {
        match self {
            PublisherParams::ChartMuseum(_) => "chartmuseum",
            PublisherParams::Artifactory(_) => "artifactory",
        }
    }
}

impl From<ChartMuseumParams> for PublisherParams {
    fn from(params: ChartMuseumParams) -> Self {
        PublisherParams::ChartMuseum(params)
    }
}

impl From<ArtifactoryParams> for PublisherParams {
    fn from(params: ArtifactoryParams) -> Self {
        PublisherParams::Artifactory(params)
    }
}
