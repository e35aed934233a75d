//! Client configuration, resolved once at startup.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Fixed timeout applied to every backend request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the backend API.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
	/// Absolute base URL without a trailing slash, e.g. `http://localhost:8000/api/v1`.
	pub base_url: String,
	/// Scheme, host and port of `base_url`; server-absolute `/api/...` paths
	/// resolve against it.
	pub origin: String,
	pub timeout: Duration,
	/// Send cookies along with cross-origin requests.
	pub with_credentials: bool,
}

impl ClientConfig {
	/// Validate `base_url` and apply the default request policy.
	pub fn new(base_url: &str) -> Result<Self, ConfigError> {
		let trimmed = base_url.trim().trim_end_matches('/');
		let parsed = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
			url: trimmed.to_string(),
			source,
		})?;
		let origin = parsed.origin();
		Ok(Self {
			base_url: trimmed.to_string(),
			origin: if origin.is_tuple() {
				origin.ascii_serialization()
			} else {
				trimmed.to_string()
			},
			timeout: DEFAULT_TIMEOUT,
			with_credentials: true,
		})
	}

	/// Read `KG_API_BASE` from the build environment. A CSR bundle has no
	/// runtime environment, so the value is baked in at compile time.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_value(option_env!("KG_API_BASE"))
	}

	fn from_value(value: Option<&str>) -> Result<Self, ConfigError> {
		match value.map(str::trim).filter(|v| !v.is_empty()) {
			Some(base) => Self::new(base),
			None => Err(ConfigError::MissingBaseUrl),
		}
	}

	/// Resolve a request path. Paths under `/api/` already carry the API
	/// prefix and hang off the origin; anything else is joined onto the base.
	pub fn endpoint(&self, path: &str) -> String {
		if path.starts_with("/api/") {
			format!("{}{}", self.origin, path)
		} else {
			format!("{}/{}", self.base_url, path.trim_start_matches('/'))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_base_url_fails_fast() {
		assert!(matches!(
			ClientConfig::from_value(None),
			Err(ConfigError::MissingBaseUrl)
		));
		assert!(matches!(
			ClientConfig::from_value(Some("  ")),
			Err(ConfigError::MissingBaseUrl)
		));
	}

	#[test]
	fn rejects_relative_base_url() {
		let err = ClientConfig::new("api/v1").unwrap_err();
		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}

	#[test]
	fn endpoint_joins_without_double_slash() {
		let config = ClientConfig::from_value(Some("http://localhost:8000/api/v1/")).unwrap();
		assert_eq!(config.base_url, "http://localhost:8000/api/v1");
		assert_eq!(config.timeout, DEFAULT_TIMEOUT);
		assert!(config.with_credentials);
		assert_eq!(
			config.endpoint("/graph/root"),
			"http://localhost:8000/api/v1/graph/root"
		);
		assert_eq!(
			config.endpoint("graph/root"),
			"http://localhost:8000/api/v1/graph/root"
		);
	}

	#[test]
	fn api_prefixed_paths_resolve_against_origin() {
		let config = ClientConfig::new("http://localhost:8000/api/v1").unwrap();
		assert_eq!(config.origin, "http://localhost:8000");
		assert_eq!(
			config.endpoint("/api/user/current"),
			"http://localhost:8000/api/user/current"
		);
		assert_eq!(
			config.endpoint("/api/v1/export/download/j1"),
			"http://localhost:8000/api/v1/export/download/j1"
		);
		// only a leading `/api/` segment counts
		assert_eq!(
			config.endpoint("/apiary"),
			"http://localhost:8000/api/v1/apiary"
		);
	}
}
