//! ChartMuseum publishing, including path-based multitenancy
//!
//! A ChartMuseum server started with `--depth=N` expects N tenant path
//! segments between `/api` and `/charts`. The tenant ids are sent as given:
//! the count is not checked against the server depth and the segments are
//! not escaped, so callers supply URL-safe ids.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::credentials::ResolvedCredentials;
use crate::http::HttpChartPublisher;
use crate::publisher::ChartPublisher;

/// Snapshot of a ChartMuseum repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMuseumParams {
    pub url: Url,
    #[serde(default)]
    pub tenant_ids: Vec<String>,
    #[serde(default)]
    pub credentials: Option<ResolvedCredentials>,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl ChartMuseumParams {
    pub fn new(
        url: Url,
        tenant_ids: Vec<String>,
        credentials: Option<ResolvedCredentials>,
    ) -> Self {
        Self {
            url,
            tenant_ids,
            credentials,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Uploads to `POST /api[/<tenant>...]/charts`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartMuseumPublisher {
    http: HttpChartPublisher,
    tenant_ids: Vec<String>,
}

impl ChartMuseumPublisher {
    pub fn new(http: HttpChartPublisher, tenant_ids: Vec<String>) -> Self {
        Self { http, tenant_ids }
    }

    pub fn tenant_ids(&self) -> &[String] {
        &self.tenant_ids
    }
}

impl From<&ChartMuseumParams> for ChartMuseumPublisher {
    fn from(params: &ChartMuseumParams) -> Self {
        let http = HttpChartPublisher::new(params.url.clone(), params.credentials.clone())
            .with_timeout(params.timeout);
        Self::new(http, params.tenant_ids.clone())
    }
}

/// `/api` + `/<tenant>` for each tenant in order + `/charts`
pub fn upload_path(tenant_ids: &[String]) -> String {
    let mut path = String::from("/api");
    for tenant in tenant_ids {
        path.push('/');
        path.push_str(tenant);
    }
    path.push_str("/charts");
    path
}

#[async_trait]
impl ChartPublisher for ChartMuseumPublisher {
    fn upload_method(&self) -> Method {
        Method::POST
    }

    // ChartMuseum reads name and version from the uploaded archive itself.
    fn upload_path(&self, _chart_name: &str, _chart_version: &str) -> String {
        upload_path(&self.tenant_ids)
    }

    fn transport(&self) -> &HttpChartPublisher {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenants(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn publisher(ids: &[&str]) -> ChartMuseumPublisher {
        let params = ChartMuseumParams::new(
            Url::parse("https://charts.example.com").unwrap(),
            tenants(ids),
            None,
        );
        ChartMuseumPublisher::from(&params)
    }

    #[test]
    fn test_upload_path_single_tenant_server() {
        assert_eq!(upload_path(&[]), "/api/charts");
    }

    #[test]
    fn test_upload_path_with_tenants() {
        assert_eq!(upload_path(&tenants(&["org1"])), "/api/org1/charts");
        assert_eq!(
            upload_path(&tenants(&["org1", "space1"])),
            "/api/org1/space1/charts"
        );
    }

    #[test]
    fn test_upload_path_matches_formula() {
        let cases: Vec<Vec<String>> = vec![
            vec![],
            tenants(&["a"]),
            tenants(&["a", "b", "c"]),
            tenants(&["acme", "team-x", "dev", "eu"]),
        ];

        for ids in cases {
            let expected = format!(
                "/api{}/charts",
                ids.iter().map(|t| format!("/{}", t)).collect::<String>()
            );
            assert_eq!(upload_path(&ids), expected);
        }
    }

    #[test]
    fn test_path_ignores_chart_name_and_version() {
        let p = publisher(&["acme"]);
        assert_eq!(p.upload_path("nginx", "1.0.0"), "/api/acme/charts");
        assert_eq!(p.upload_path("redis", "17.3.2"), "/api/acme/charts");
    }

    #[test]
    fn test_method_is_always_post() {
        for ids in [&[][..], &["acme"][..], &["acme", "team-x"][..]] {
            let p = publisher(ids);
            assert_eq!(p.upload_method(), Method::POST);
            assert_eq!(p.upload_method().as_str(), "POST");
        }
    }

    #[test]
    fn test_publisher_holds_params_values() {
        let creds = ResolvedCredentials::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        let params = ChartMuseumParams::new(
            Url::parse("https://charts.example.com").unwrap(),
            tenants(&["acme"]),
            Some(creds.clone()),
        )
        .with_timeout(Some(Duration::from_secs(5)));

        let p = ChartMuseumPublisher::from(&params);
        assert_eq!(p.tenant_ids(), &["acme".to_string()]);
        assert_eq!(p.transport().url(), &params.url);
        assert_eq!(p.transport().credentials(), Some(&creds));
        assert_eq!(p.transport().timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_tenant_ids_are_not_escaped() {
        assert_eq!(upload_path(&tenants(&["a/b"])), "/api/a/b/charts");
    }

    #[test]
    fn test_upload_path_snapshot() {
        insta::assert_snapshot!(upload_path(&tenants(&["acme", "team-x"])), @"/api/acme/team-x/charts");
    }
}
