//! Typed client for the Atlas Administration API (and the Ops Manager public API).
//!
//! Every request carries a versioned media type, e.g. `application/vnd.atlas.2024-08-05+json`,
//! which selects the resource shape the server returns. Endpoints are implemented per resource
//! in [`crate::dependencies`] on top of the helpers defined here.
use std::sync::Arc;

use reqwest::{
    Method,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, trace};
use url::Url;

use crate::config::{Profile, Service};

mod auth;
mod digest;
mod error;

pub use auth::Credentials;
pub use error::{ApiError, AtlasError};

/// API versions used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    /// Default version for most resources.
    V20230101,
    /// Cluster-wide scaling cluster shape.
    V20230201,
    /// Independent shard scaling cluster shape and auto-scaling configuration.
    V20240805,
    /// Flex clusters.
    V20241113,
}

impl ApiVersion {
    pub fn date(&self) -> &'static str {
        match self {
            Self::V20230101 => "2023-01-01",
            Self::V20230201 => "2023-02-01",
            Self::V20240805 => "2024-08-05",
            Self::V20241113 => "2024-11-13",
        }
    }

    fn media_type(&self, service: Service) -> String {
        match service {
            Service::OpsManager => "application/json".to_string(),
            Service::Cloud | Service::CloudGov => {
                format!("application/vnd.atlas.{}+json", self.date())
            }
        }
    }
}

/// Paging parameters of list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub page_num: Option<u32>,
    pub items_per_page: Option<u32>,
    pub include_count: Option<bool>,
}

impl ListOptions {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page_num) = self.page_num {
            query.push(("pageNum", page_num.to_string()));
        }
        if let Some(items_per_page) = self.items_per_page {
            query.push(("itemsPerPage", items_per_page.to_string()));
        }
        if let Some(include_count) = self.include_count {
            query.push(("includeCount", include_count.to_string()));
        }
        query
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            total_count: None,
        }
    }
}

#[cfg(test)]
impl<T> Paginated<T> {
    pub fn new(results: Vec<T>) -> Self {
        let total_count = Some(results.len() as u64);
        Self {
            results,
            total_count,
        }
    }
}

/// Client for the Administration API.
///
/// Cheap to clone; clones share the HTTP connection pool and authentication state.
#[derive(Clone)]
pub struct AtlasClient {
    http: reqwest::Client,
    base_url: Url,
    service: Service,
    auth: Arc<auth::Authenticator>,
}

impl std::fmt::Debug for AtlasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlasClient")
            .field("base_url", &self.base_url.as_str())
            .field("service", &self.service)
            .finish()
    }
}

fn user_agent() -> String {
    format!(
        "atlascli/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

impl AtlasClient {
    pub fn new(base_url: &str, service: Service, credentials: Credentials) -> Result<Self, AtlasError> {
        let base_url = Url::parse(base_url)?;
        let http = reqwest::Client::builder().user_agent(user_agent()).build()?;
        let auth = auth::Authenticator::new(credentials, http.clone(), &base_url)?;

        Ok(Self {
            http,
            base_url,
            service,
            auth: Arc::new(auth),
        })
    }

    pub fn from_profile(profile: &Profile) -> anyhow::Result<Self> {
        Ok(Self::new(
            &profile.base_url()?,
            profile.service()?,
            profile.credentials(),
        )?)
    }

    /// Fail for endpoints that only exist in Atlas.
    pub fn require_atlas(&self) -> Result<(), AtlasError> {
        match self.service {
            Service::OpsManager => Err(AtlasError::UnsupportedService(self.service)),
            Service::Cloud | Service::CloudGov => Ok(()),
        }
    }

    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, AtlasError> {
        let prefix: &[&str] = match self.service {
            Service::OpsManager => &["api", "public", "v1.0"],
            Service::Cloud | Service::CloudGov => &["api", "atlas", "v2"],
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(prefix)
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        version: ApiVersion,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> Result<String, AtlasError> {
        if !self.auth.has_credentials() {
            return Err(AtlasError::MissingCredentials);
        }

        let url = self.url(segments, query)?;
        let media_type = version.media_type(self.service);
        let uri = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        let mut retried = false;
        loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(ACCEPT, &media_type);

            if let Some(body) = &body {
                request = request.header(CONTENT_TYPE, &media_type).body(body.clone());
            }

            if let Some(authorization) = self.auth.authorization(method.as_str(), &uri).await? {
                request = request.header(AUTHORIZATION, authorization);
            }

            debug!(%method, %url, version = version.date(), "sending request");
            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::UNAUTHORIZED && !retried {
                let challenge = response
                    .headers()
                    .get(WWW_AUTHENTICATE)
                    .and_then(|value| value.to_str().ok());
                if self.auth.handle_unauthorized(challenge).await {
                    retried = true;
                    continue;
                }
            }

            let text = response.text().await?;
            trace!(status = status.as_u16(), body = %text, "received response");

            if status.is_success() {
                return Ok(text);
            }

            return Err(AtlasError::Api(ApiError::from_response(status.as_u16(), &text)));
        }
    }

    fn decode<T: DeserializeOwned>(text: &str) -> Result<T, AtlasError> {
        // Some endpoints answer 202/204 without a body.
        let text = if text.trim().is_empty() { "null" } else { text };
        Ok(serde_json::from_str(text)?)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        version: ApiVersion,
        query: &[(&str, String)],
    ) -> Result<T, AtlasError> {
        let text = self
            .execute(Method::GET, segments, version, query, None)
            .await?;
        Self::decode(&text)
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        version: ApiVersion,
        options: &ListOptions,
        extra_query: &[(&str, String)],
    ) -> Result<Paginated<T>, AtlasError> {
        let mut query: Vec<(&str, String)> = options.query();
        query.extend(extra_query.iter().cloned());
        self.get(segments, version, &query).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        version: ApiVersion,
        body: &B,
    ) -> Result<T, AtlasError> {
        let body = serde_json::to_vec(body)?;
        let text = self
            .execute(Method::POST, segments, version, &[], Some(body))
            .await?;
        Self::decode(&text)
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        version: ApiVersion,
        body: &B,
    ) -> Result<T, AtlasError> {
        let body = serde_json::to_vec(body)?;
        let text = self
            .execute(Method::PATCH, segments, version, &[], Some(body))
            .await?;
        Self::decode(&text)
    }

    pub async fn delete(
        &self,
        segments: &[&str],
        version: ApiVersion,
        query: &[(&str, String)],
    ) -> Result<(), AtlasError> {
        self.execute(Method::DELETE, segments, version, query, None)
            .await
            .map(|_| ())
    }
}
