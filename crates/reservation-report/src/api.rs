//! Client for the JHMH reporting API.
//!
//! One request per call: no retries and no backoff. Failures are mapped to
//! [`ApiError`], whose messages are the French texts shown to operators.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use reservation_details::ReservationDetails;

use crate::config::DEFAULT_TIMEOUT_SECS;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration API invalide: {0}")]
    Config(String),
    #[error("Code de confirmation manquant")]
    MissingCode,
    #[error("Erreur de validation")]
    Validation,
    #[error("Réservation non trouvée")]
    NotFound,
    #[error("Timeout de la requête")]
    Timeout,
    #[error("Erreur serveur (HTTP {0})")]
    Server(u16),
    #[error("Erreur inconnue (HTTP {0})")]
    Unknown(u16),
    #[error("Erreur réseau: {0}")]
    Network(String),
    #[error("Format de réponse inattendu")]
    UnexpectedFormat,
}

impl ApiError {
    /// Map a non-success HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::Validation,
            404 => Self::NotFound,
            408 => Self::Timeout,
            code @ (500 | 502 | 503) => Self::Server(code),
            code => Self::Unknown(code),
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::UnexpectedFormat
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Optional flags of the reservation details endpoint. Unset flags are not
/// sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailsQuery {
    pub include_logs: Option<bool>,
    pub include_audit_note: Option<bool>,
    pub force_trace: Option<bool>,
    pub force_value: Option<bool>,
}

impl DetailsQuery {
    fn pairs(&self) -> Vec<(&'static str, bool)> {
        [
            ("include_logs", self.include_logs),
            ("include_audit_note", self.include_audit_note),
            ("force_trace", self.force_trace),
            ("force_value", self.force_value),
        ]
        .into_iter()
        .filter_map(|(name, flag)| flag.map(|f| (name, f)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub status: Option<String>,
    pub message: String,
}

/// `{ data, error, message, timestamp }` wrapper around every payload.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ApiError::Config(format!("URL de base invalide ({}): {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Config(format!("URL de base invalide: {}", config.base_url)));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ApiError::Config("clé API non valide dans un en-tête HTTP".to_string()))?;
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, ApiError> {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(%url, error = %e, "request failed");
            ApiError::from_transport(e)
        })?;

        let status = response.status();
        debug!(%url, %status, "response");
        if !status.is_success() {
            warn!(%url, %status, "reporting API returned an error status");
            return Err(ApiError::from_status(status));
        }

        let body = response.bytes().await.map_err(ApiError::from_transport)?;
        Ok(body.to_vec())
    }

    /// Fetch the full details of one reservation.
    pub async fn fetch_reservation(&self, code: &str, query: &DetailsQuery) -> Result<ReservationDetails, ApiError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ApiError::MissingCode);
        }

        let mut url = self.endpoint(&["api", "reservations", code]);
        let pairs = query.pairs();
        if !pairs.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (name, flag) in pairs {
                query_pairs.append_pair(name, if flag { "true" } else { "false" });
            }
        }

        let body = self.get(url).await?;
        let envelope: Envelope = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "reservation payload is not a JSON envelope");
            ApiError::UnexpectedFormat
        })?;
        debug!(
            error = ?envelope.error,
            api_message = envelope.message.as_deref().unwrap_or(""),
            timestamp = envelope.timestamp.as_deref().unwrap_or(""),
            "envelope received"
        );

        match envelope.data {
            Some(data @ Value::Object(_)) => Ok(ReservationDetails::from_value(data)),
            _ => Err(ApiError::UnexpectedFormat),
        }
    }

    /// Probe the API health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let body = self.get(self.endpoint(&["health"])).await?;
        let response: HealthResponse = serde_json::from_slice(&body).map_err(|_| ApiError::UnexpectedFormat)?;

        Ok(HealthStatus {
            healthy: response.status.as_deref() == Some("healthy"),
            status: response.status,
            message: response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Health check completed".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&ApiConfig::new(server.uri(), "test-key")).expect("api client")
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(ApiError::from_status(StatusCode::BAD_REQUEST), ApiError::Validation));
        assert!(matches!(ApiError::from_status(StatusCode::NOT_FOUND), ApiError::NotFound));
        assert!(matches!(ApiError::from_status(StatusCode::REQUEST_TIMEOUT), ApiError::Timeout));
        assert!(matches!(ApiError::from_status(StatusCode::BAD_GATEWAY), ApiError::Server(502)));
        assert!(matches!(ApiError::from_status(StatusCode::UNAUTHORIZED), ApiError::Unknown(401)));
        assert!(matches!(ApiError::from_status(StatusCode::GATEWAY_TIMEOUT), ApiError::Unknown(504)));
    }

    #[test]
    fn query_only_carries_set_flags() {
        let query = DetailsQuery {
            include_logs: Some(true),
            force_value: Some(false),
            ..Default::default()
        };
        assert_eq!(query.pairs(), vec![("include_logs", true), ("force_value", false)]);
        assert!(DetailsQuery::default().pairs().is_empty());
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(
            ApiClient::new(&ApiConfig::new("not a url", "k")),
            Err(ApiError::Config(_))
        ));
    }

    #[tokio::test]
    async fn fetches_reservation_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reservations/HMABC123"))
            .and(header("x-api-key", "test-key"))
            .and(query_param("include_logs", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "confirmationCode": "HMABC123", "STATE": "CONFIRMED" },
                "error": false,
                "message": "OK",
                "timestamp": "2025-06-01T10:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = DetailsQuery {
            include_logs: Some(true),
            ..Default::default()
        };
        let record = client_for(&server).fetch_reservation("HMABC123", &query).await.unwrap();
        assert_eq!(record.confirmation_code().as_deref(), Some("HMABC123"));
    }

    #[tokio::test]
    async fn missing_data_is_unexpected_format() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null, "error": true })))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_reservation("X1", &DetailsQuery::default()).await;
        assert!(matches!(result, Err(ApiError::UnexpectedFormat)));
    }

    #[tokio::test]
    async fn not_found_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_reservation("NOPE", &DetailsQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(err.to_string(), "Réservation non trouvée");
    }

    #[tokio::test]
    async fn server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_reservation("X1", &DetailsQuery::default()).await;
        assert!(matches!(result, Err(ApiError::Server(503))));
    }

    #[tokio::test]
    async fn empty_code_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_reservation("  ", &DetailsQuery::default()).await;
        assert!(matches!(result, Err(ApiError::MissingCode)));
    }

    #[tokio::test]
    async fn slow_responses_time_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let config = ApiConfig::new(server.uri(), "k").with_timeout(Duration::from_millis(50));
        let client = ApiClient::new(&config).unwrap();
        let result = client.fetch_reservation("X1", &DetailsQuery::default()).await;
        assert!(matches!(result, Err(ApiError::Timeout)));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&ApiConfig::new(format!("http://{addr}"), "k")).unwrap();
        let result = client.health().await;
        assert!(matches!(result, Err(ApiError::Network(_))));
    }

    #[tokio::test]
    async fn health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "healthy" })))
            .mount(&server)
            .await;

        let health = client_for(&server).health().await.unwrap();
        assert!(health.healthy);
        assert_eq!(health.message, "Health check completed");
    }

    #[tokio::test]
    async fn degraded_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "degraded", "message": "db slow" })),
            )
            .mount(&server)
            .await;

        let health = client_for(&server).health().await.unwrap();
        assert!(!health.healthy);
        assert_eq!(health.status.as_deref(), Some("degraded"));
        assert_eq!(health.message, "db slow");
    }
}
