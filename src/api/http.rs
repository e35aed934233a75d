//! Pre-configured HTTP client: one transport plus an ordered middleware pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::middleware::{AuthRedirect, MockFallback, Navigator, Pipeline, ResponseLogger};
use crate::config::ClientConfig;
use crate::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
}

/// A request as the caller issued it. `url` is relative to the API base and
/// is the key mocks are matched on.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
	pub method: Method,
	pub url: String,
	pub query: Vec<(String, String)>,
	pub body: Option<Value>,
}

impl ApiRequest {
	pub fn get(url: impl Into<String>, query: Vec<(String, String)>) -> Self {
		Self {
			method: Method::Get,
			url: url.into(),
			query,
			body: None,
		}
	}

	pub fn post(url: impl Into<String>, body: Value) -> Self {
		Self {
			method: Method::Post,
			url: url.into(),
			query: Vec::new(),
			body: Some(body),
		}
	}
}

/// A 2xx response with its body parsed as JSON (`Null` when empty).
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
	pub status: u16,
	pub status_text: String,
	pub body: Value,
}

/// Performs network I/O for one request. Futures are not `Send` because the
/// browser `fetch` bindings are not.
#[async_trait(?Send)]
pub trait Transport: Send + Sync {
	async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// [`Transport`] backed by `reqwest` (browser `fetch` on wasm32).
pub struct ReqwestTransport {
	client: reqwest::Client,
	config: ClientConfig,
}

impl ReqwestTransport {
	pub fn new(config: ClientConfig) -> Self {
		Self {
			client: reqwest::Client::new(),
			config,
		}
	}

	fn timeout(&self) -> Duration {
		self.config.timeout
	}
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
	async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
		let url = self.config.endpoint(&request.url);
		let mut builder = match request.method {
			Method::Get => self.client.get(&url),
			Method::Post => self.client.post(&url),
		};
		if !request.query.is_empty() {
			builder = builder.query(&request.query);
		}
		if let Some(body) = &request.body {
			builder = builder.json(body);
		}
		builder = builder.timeout(self.timeout());
		#[cfg(target_arch = "wasm32")]
		let builder = if self.config.with_credentials {
			builder.fetch_credentials_include()
		} else {
			builder
		};

		let response = builder.send().await?;
		let status = response.status();
		let text = response.text().await?;
		if !status.is_success() {
			return Err(ApiError::Status {
				status: status.as_u16(),
				body: text,
			});
		}
		let body = if text.trim().is_empty() {
			Value::Null
		} else {
			serde_json::from_str(&text)?
		};
		Ok(ApiResponse {
			status: status.as_u16(),
			status_text: status.canonical_reason().unwrap_or_default().to_string(),
			body,
		})
	}
}

/// Cheap to clone; shared by every API facade in the app.
#[derive(Clone)]
pub struct HttpClient {
	transport: Arc<dyn Transport>,
	pipeline: Arc<Pipeline>,
}

impl HttpClient {
	/// Production client: `reqwest` transport with the logger, auth-redirect
	/// and mock-fallback stages, in that order.
	pub fn new(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Self {
		let pipeline = Pipeline::new()
			.with(ResponseLogger)
			.with(AuthRedirect::new(navigator))
			.with(MockFallback::with_defaults());
		Self::with_transport(Arc::new(ReqwestTransport::new(config)), pipeline)
	}

	pub fn with_transport(transport: Arc<dyn Transport>, pipeline: Pipeline) -> Self {
		Self {
			transport,
			pipeline: Arc::new(pipeline),
		}
	}

	/// Send `request` and run the outcome through the pipeline.
	pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
		debug!("{:?} {}", request.method, request.url);
		let outcome = self.transport.send(&request).await;
		self.pipeline.run(&request, outcome)
	}

	pub async fn get<T: DeserializeOwned>(
		&self,
		url: &str,
		query: Vec<(String, String)>,
	) -> Result<T, ApiError> {
		let response = self.execute(ApiRequest::get(url, query)).await?;
		Ok(serde_json::from_value(response.body)?)
	}

	pub async fn post<T: DeserializeOwned, B: Serialize>(
		&self,
		url: &str,
		body: &B,
	) -> Result<T, ApiError> {
		let body = serde_json::to_value(body)?;
		let response = self.execute(ApiRequest::post(url, body)).await?;
		Ok(serde_json::from_value(response.body)?)
	}
}
