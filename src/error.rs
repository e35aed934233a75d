//! Error types shared by the API client and startup configuration.

use thiserror::Error;

/// Failure of a backend request, after the middleware pipeline has run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
	/// The request never produced a response (DNS, CORS, connection reset, ...).
	#[error("network error: {0}")]
	Transport(String),

	/// The per-request timeout elapsed.
	#[error("request timed out")]
	Timeout,

	/// The backend answered outside the 2xx range.
	#[error("HTTP {status}: {body}")]
	Status { status: u16, body: String },

	/// The body was not the JSON shape the caller asked for.
	#[error("failed to decode response: {0}")]
	Decode(String),
}

impl ApiError {
	/// Status code of an HTTP-level failure, if there was a response at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			ApiError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}
}

impl From<reqwest::Error> for ApiError {
	fn from(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			ApiError::Timeout
		} else if err.is_decode() {
			ApiError::Decode(err.to_string())
		} else {
			ApiError::Transport(err.to_string())
		}
	}
}

impl From<serde_json::Error> for ApiError {
	fn from(err: serde_json::Error) -> Self {
		ApiError::Decode(err.to_string())
	}
}

/// Startup configuration problems. These stop the app from mounting.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("KG_API_BASE is not set; rebuild with e.g. KG_API_BASE=http://localhost:8000/api/v1")]
	MissingBaseUrl,

	#[error("invalid API base URL {url:?}: {source}")]
	InvalidBaseUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},
}
