//! HTTP upload shared by all publisher flavors
//!
//! A flavor decides the method and path; this type sends the request: it
//! joins the path onto the repository URL, attaches the archive and the
//! credential snapshot, and turns non-2xx responses into errors.

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::credentials::ResolvedCredentials;
use crate::error::{RepoError, Result};

/// Media type of a packaged chart
pub const CHART_CONTENT_TYPE: &str = "application/gzip";

/// HTTP upload client for one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpChartPublisher {
    url: Url,
    #[serde(default)]
    credentials: Option<ResolvedCredentials>,
    #[serde(default, with = "humantime_serde")]
    timeout: Option<Duration>,
}

impl HttpChartPublisher {
    pub fn new(url: Url, credentials: Option<ResolvedCredentials>) -> Self {
        Self {
            url,
            credentials,
            timeout: None,
        }
    }

    /// Limit the whole request to `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the repository
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Credential snapshot attached to every request
    pub fn credentials(&self) -> Option<&ResolvedCredentials> {
        self.credentials.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full request URL for an upload path
    ///
    /// The path is appended to the base URL's own path, so a repository served
    /// under a prefix (`https://host/prefix`) keeps it.
    pub fn request_url(&self, path: &str) -> Url {
        let mut url = self.url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }

    fn client(&self) -> Result<reqwest::Client> {
        // Redirects come back as errors; credentials stay on the configured host.
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| RepoError::NetworkError {
            message: e.to_string(),
        })
    }

    /// Send `archive` with `method` to `path` below the repository URL
    pub async fn upload(
        &self,
        method: Method,
        path: &str,
        chart_name: &str,
        chart_version: &str,
        archive: &[u8],
    ) -> Result<()> {
        let url = self.request_url(path);
        let client = self.client()?;

        let mut request = client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, CHART_CONTENT_TYPE)
            .body(archive.to_vec());

        if let Some(creds) = &self.credentials {
            request = request.header(AUTHORIZATION, creds.auth_header());
        }

        tracing::debug!(
            %method,
            %url,
            chart = chart_name,
            version = chart_version,
            bytes = archive.len(),
            authenticated = self.credentials.is_some(),
            "uploading chart"
        );

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!(%url, chart = chart_name, version = chart_version, "chart uploaded");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%url, status = status.as_u16(), "chart upload rejected");

        Err(match status {
            StatusCode::UNAUTHORIZED => RepoError::AuthRequired {
                url: url.to_string(),
            },
            StatusCode::FORBIDDEN => RepoError::AuthFailed {
                message: format!("Access denied to {}", url),
            },
            StatusCode::CONFLICT => RepoError::ChartAlreadyExists {
                name: chart_name.to_string(),
                version: chart_version.to_string(),
            },
            _ => RepoError::HttpError {
                status: status.as_u16(),
                message: error_message(&body)
                    .unwrap_or_else(|| format!("Upload to {} failed", url)),
            },
        })
    }
}

/// Pull a readable message out of an error response body
///
/// ChartMuseum answers with `{"error": "..."}`; other servers send text.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = json.get("error").and_then(|v| v.as_str()) {
            return Some(msg.to_string());
        }
    }

    Some(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(url: &str) -> HttpChartPublisher {
        HttpChartPublisher::new(Url::parse(url).unwrap(), None)
    }

    #[test]
    fn test_request_url_root() {
        let p = publisher("https://charts.example.com");
        assert_eq!(
            p.request_url("/api/charts").as_str(),
            "https://charts.example.com/api/charts"
        );
    }

    #[test]
    fn test_request_url_keeps_prefix() {
        let p = publisher("https://example.com/chartmuseum/");
        assert_eq!(
            p.request_url("/api/acme/charts").as_str(),
            "https://example.com/chartmuseum/api/acme/charts"
        );

        let p = publisher("https://example.com/chartmuseum");
        assert_eq!(
            p.request_url("/api/charts").as_str(),
            "https://example.com/chartmuseum/api/charts"
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"error":"file already exists"}"#).as_deref(),
            Some("file already exists")
        );
        assert_eq!(error_message("  bad gateway \n").as_deref(), Some("bad gateway"));
        assert_eq!(error_message(""), None);
    }

    #[test]
    fn test_timeout_serde() {
        let p = publisher("https://example.com").with_timeout(Some(Duration::from_secs(30)));
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"30s\""));

        let back: HttpChartPublisher = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
