//! # Module: Backend Client
//!
//! ## Responsibility
//! Fetch the dashboard snapshot and per-feature details from the DriftGuard
//! backend over HTTP and decode them into [`crate::api`] types.
//!
//! ## Guarantees
//! - Bounded: every request carries connect and total timeouts
//! - Feature names are percent-encoded as a single path segment
//! - Failures are classified: transport, non-2xx status, undecodable body
//!
//! ## NOT Responsible For
//! - Retrying (that belongs to `poller`)

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, trace};

use super::{DashboardSnapshot, FeatureDetails};
use crate::config::PollerConfig;

/// Why a backend request failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The configured base URL cannot carry API paths.
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Connection refused, timeout, TLS failure and the like.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("backend returned HTTP {0}")]
    Status(u16),

    /// The body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the DriftGuard backend.
///
/// Cheap to clone; clones share the connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use driftguard_live::DriftGuardClient;
///
/// # async fn example() -> Result<(), driftguard_live::FetchError> {
/// let client = DriftGuardClient::new(
///     "http://127.0.0.1:5000",
///     Duration::from_secs(3),
///     Duration::from_secs(10),
/// )?;
/// let snapshot = client.dashboard().await?;
/// println!("health: {}", snapshot.health_score);
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct DriftGuardClient {
    base: Url,
    http: reqwest::Client,
}

impl DriftGuardClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    /// - [`FetchError::InvalidUrl`] if `base_url` does not parse or cannot be a base.
    /// - [`FetchError::Network`] if the TLS backend fails to initialise.
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, FetchError> {
        let base = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl {
                url: base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self { base, http })
    }

    /// Creates a client from the poller section of the configuration.
    ///
    /// # Errors
    /// Same as [`DriftGuardClient::new`].
    pub fn from_config(config: &PollerConfig) -> Result<Self, FetchError> {
        Self::new(
            &config.base_url,
            config.connect_timeout(),
            config.request_timeout(),
        )
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /api/dashboard-data`.
    ///
    /// # Errors
    /// Any [`FetchError`] variant except `InvalidUrl`.
    pub async fn dashboard(&self) -> Result<DashboardSnapshot, FetchError> {
        let url = self.endpoint(&["api", "dashboard-data"])?;
        self.get_json(url).await
    }

    /// `GET /api/feature-details/{name}`, with `name` percent-encoded.
    ///
    /// # Errors
    /// Any [`FetchError`] variant.
    pub async fn feature_details(&self, name: &str) -> Result<FeatureDetails, FetchError> {
        let url = self.endpoint(&["api", "feature-details", name])?;
        self.get_json(url).await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl {
                url: self.base.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        trace!(url = %url, "backend request");
        let resp = self.http.get(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "backend returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DriftGuardClient {
        DriftGuardClient::new(
            &server.uri(),
            Duration::from_secs(1),
            Duration::from_secs(2),
        )
        .expect("test: client builds")
    }

    fn snapshot_body() -> serde_json::Value {
        serde_json::json!({
            "health_score": 82,
            "metrics": [{"label": "Total Predictions", "value": "1,500", "change": 3.1}],
            "alerts": [{"id": 7, "type": "warning", "message": "Drift in age", "timestamp": "Just now"}],
            "drift_summary": {"score": 0.2, "drifting_count": 1, "total_count": 5},
            "top_features": [{"name": "age", "psi": 0.12, "status": "Warning"}]
        })
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let result = DriftGuardClient::new("not a url", Duration::ZERO, Duration::ZERO);
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_rejects_cannot_be_a_base_url() {
        let result = DriftGuardClient::new("mailto:ops@example.com", Duration::ZERO, Duration::ZERO);
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_endpoint_encodes_feature_name() {
        let client = DriftGuardClient::new(
            "http://localhost:5000/",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .expect("test: client builds");
        let url = client
            .endpoint(&["api", "feature-details", "credit score/v2"])
            .expect("test: endpoint");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/feature-details/credit%20score%2Fv2"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = DriftGuardClient::new(
            "http://localhost:5000/driftguard",
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .expect("test: client builds");
        let url = client.endpoint(&["api", "dashboard-data"]).expect("test: endpoint");
        assert_eq!(url.path(), "/driftguard/api/dashboard-data");
    }

    #[tokio::test]
    async fn test_dashboard_decodes_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard-data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body()))
            .mount(&server)
            .await;

        let snap = client_for(&server).dashboard().await.expect("test: fetch");
        assert_eq!(snap.health_score, 82.0);
        assert_eq!(snap.alerts.len(), 1);
        assert_eq!(snap.top_features[0].name, "age");
    }

    #[tokio::test]
    async fn test_dashboard_non_2xx_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard-data"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).dashboard().await.err();
        assert!(matches!(err, Some(FetchError::Status(503))));
    }

    #[tokio::test]
    async fn test_dashboard_bad_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard-data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"health_score\": "))
            .mount(&server)
            .await;

        let err = client_for(&server).dashboard().await.err();
        assert!(matches!(err, Some(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_feature_details_hits_encoded_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/feature-details/credit%20score"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "psi": 0.05,
                "status": "good",
                "baseline_stats": {"mean": 1.0, "median": 1.0, "std": 0.1, "min": 0.0, "max": 2.0},
                "production_stats": {"mean": 1.1, "median": 1.0, "std": 0.1, "min": 0.0, "max": 2.1},
                "chart_data": []
            })))
            .mount(&server)
            .await;

        let details = client_for(&server)
            .feature_details("credit score")
            .await
            .expect("test: fetch");
        assert_eq!(details.psi, 0.05);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let client = DriftGuardClient::new(
            "http://127.0.0.1:1",
            Duration::from_millis(200),
            Duration::from_millis(500),
        )
        .expect("test: client builds");
        let err = client.dashboard().await.err();
        assert!(matches!(err, Some(FetchError::Network(_))));
    }
}
