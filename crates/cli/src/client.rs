//! Compute API Client

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use ocipower_common::crypto::RequestParts;
use ocipower_common::{
    compute_endpoint, ActionRequest, ActionResponse, Error, OciConfig, RequestSigner, Result,
    API_VERSION,
};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const JSON: &str = "application/json";

/// Remote operations the invoker needs from the provider
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Submit one power action and return the provider's acknowledgment
    async fn instance_action(&self, request: &ActionRequest) -> Result<ActionResponse>;
}

/// Client construction options
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Overrides the region from the config
    pub region: Option<String>,
    /// Overrides the regional endpoint entirely
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            region: None,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Signed HTTP client for the compute API
pub struct ComputeClient {
    http: reqwest::Client,
    endpoint: Url,
    host: String,
    signer: RequestSigner,
}

impl ComputeClient {
    /// Create a client bound to the given credentials
    pub fn new(config: &OciConfig, options: ClientOptions) -> Result<Self> {
        let signer = RequestSigner::from_config(config)?;
        Self::with_signer(config, signer, options)
    }

    /// Create a client with an already loaded signer
    pub fn with_signer(config: &OciConfig, signer: RequestSigner, options: ClientOptions) -> Result<Self> {
        let endpoint = options.endpoint.clone().unwrap_or_else(|| {
            compute_endpoint(options.region.as_deref().unwrap_or(&config.region))
        });
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| Error::Configuration(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Error::Configuration(format!(
                    "endpoint '{}' has no host",
                    endpoint
                )))
            }
        };

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(format!("ocipower/{}", ocipower_common::VERSION))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        debug!("Compute client bound to {} as {}", endpoint, signer.key_id());

        Ok(Self {
            http,
            endpoint,
            host,
            signer,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn action_url(&self, request: &ActionRequest) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::Configuration(format!("endpoint '{}' cannot carry a path", self.endpoint))
            })?
            .pop_if_empty()
            .push(API_VERSION)
            .push("instances")
            .push(request.instance_id.as_str());
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut()
            .append_pair("action", request.action.as_str());
        Ok(url)
    }
}

#[async_trait]
impl ComputeApi for ComputeClient {
    async fn instance_action(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let url = self.action_url(request)?;
        // POST bodies are always signed, even when empty
        let body = request.body()?.unwrap_or_default();
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let date = http_date();

        let signed = self.signer.sign(&RequestParts {
            method: "POST",
            path_and_query: &path_and_query,
            host: &self.host,
            date: &date,
            content_type: JSON,
            body: Some(&body),
        });

        debug!("POST {} ({} byte body)", url, body.len());

        let mut builder = self
            .http
            .post(url.clone())
            .header(header::DATE, &date)
            .header(header::HOST, &self.host)
            .header(header::ACCEPT, JSON)
            .header(header::CONTENT_TYPE, JSON)
            .header(header::CONTENT_LENGTH, body.len().to_string())
            .header("x-content-sha256", signed.content_sha256.unwrap_or_default())
            .header(header::AUTHORIZATION, signed.authorization);
        if let Some(token) = &request.retry_token {
            builder = builder.header("opc-retry-token", token);
        }
        if let Some(etag) = &request.if_match {
            builder = builder.header(header::IF_MATCH, etag);
        }

        let response = builder.body(body).send().await.map_err(transport_error)?;

        let status = response.status();
        let request_id = header_value(response.headers(), "opc-request-id");
        let etag = header_value(response.headers(), "etag");
        debug!("Response from POST {}: {} (opc-request-id {:?})", url, status, request_id);

        if status.is_success() {
            let bytes = response.bytes().await.map_err(transport_error)?;
            return Ok(ActionResponse::from_body(accepted_body(&bytes), request_id, etag));
        }

        let text = response.text().await.unwrap_or_default();
        Err(rejection(status, &text, request_id))
    }
}

/// Body of an accepted action. The action already happened, so an empty or
/// non-JSON body is passed through rather than turned into an error.
fn accepted_body(bytes: &[u8]) -> serde_json::Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        warn!("Accepted response body is not JSON: {}", e);
        serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
    })
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Map a non-success response to an error
fn rejection(status: StatusCode, text: &str, request_id: Option<String>) -> Error {
    let body: Option<ErrorBody> = serde_json::from_str(text).ok();
    let (code, message) = match body {
        Some(body) if !body.code.is_empty() || !body.message.is_empty() => (body.code, body.message),
        _ => (
            status.canonical_reason().unwrap_or("Unknown").replace(' ', ""),
            if text.is_empty() {
                status.to_string()
            } else {
                text.to_string()
            },
        ),
    };

    if status == StatusCode::UNAUTHORIZED {
        return Error::Authentication(format!("{}: {}", code, message));
    }

    Error::RemoteAction {
        status: status.as_u16(),
        code,
        message,
        request_id,
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Network(format!("request timed out: {}", e))
    } else if e.is_decode() {
        Error::Network(format!("invalid response body: {}", e))
    } else {
        Error::Network(e.to_string())
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// RFC 7231 date for the `date` header
fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}
