//! Artifactory Helm repositories
//!
//! Artifactory stores uploaded charts as plain files: the archive is `PUT`
//! under its conventional file name below the repository URL.

use async_trait::async_trait;
use chartpush_core::default_archive_name;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::credentials::ResolvedCredentials;
use crate::http::HttpChartPublisher;
use crate::publisher::ChartPublisher;

/// Snapshot of an Artifactory repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactoryParams {
    pub url: Url,
    #[serde(default)]
    pub credentials: Option<ResolvedCredentials>,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl ArtifactoryParams {
    pub fn new(url: Url, credentials: Option<ResolvedCredentials>) -> Self {
        Self {
            url,
            credentials,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Uploads to `PUT /<name>-<version>.tgz`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactoryPublisher {
    http: HttpChartPublisher,
}

impl From<&ArtifactoryParams> for ArtifactoryPublisher {
    fn from(params: &ArtifactoryParams) -> Self {
        Self {
            http: HttpChartPublisher::new(params.url.clone(), params.credentials.clone())
                .with_timeout(params.timeout),
        }
    }
}

#[async_trait]
impl ChartPublisher for ArtifactoryPublisher {
    fn upload_method(&self) -> Method {
        Method::PUT
    }

    fn upload_path(&self, chart_name: &str, chart_version: &str) -> String {
        format!("/{}", default_archive_name(chart_name, chart_version))
    }

    fn transport(&self) -> &HttpChartPublisher {
        &self.http
    }
}
