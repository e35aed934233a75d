//! Response middleware. Stages run in registration order; each one may pass
//! the outcome on, resolve it early, or reject it early.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Value, json};
use url::form_urlencoded;

use super::http::{ApiRequest, ApiResponse};
use crate::error::ApiError;

/// Application code the backend puts in a 2xx body when the session is gone.
pub const NOT_LOGGED_IN: i64 = 40100;
pub const LOGIN_PATH: &str = "/user/login";
const CURRENT_USER_MARKER: &str = "user/current";

pub type Outcome = Result<ApiResponse, ApiError>;

/// What a stage decided.
#[derive(Debug)]
pub enum Flow {
	Next(Outcome),
	Resolve(ApiResponse),
	Reject(ApiError),
}

pub trait Middleware: Send + Sync {
	fn handle(&self, request: &ApiRequest, outcome: Outcome) -> Flow;
}

#[derive(Clone, Default)]
pub struct Pipeline {
	stages: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with(mut self, stage: impl Middleware + 'static) -> Self {
		self.stages.push(Arc::new(stage));
		self
	}

	pub fn run(&self, request: &ApiRequest, outcome: Outcome) -> Outcome {
		let mut outcome = outcome;
		for stage in &self.stages {
			match stage.handle(request, outcome) {
				Flow::Next(next) => outcome = next,
				Flow::Resolve(response) => return Ok(response),
				Flow::Reject(err) => return Err(err),
			}
		}
		outcome
	}
}

/// Logs every outcome and passes it on untouched.
pub struct ResponseLogger;

impl Middleware for ResponseLogger {
	fn handle(&self, request: &ApiRequest, outcome: Outcome) -> Flow {
		match &outcome {
			Ok(response) => debug!("{} -> {} {}", request.url, response.status, response.status_text),
			Err(err) => warn!("{} failed: {}", request.url, err),
		}
		Flow::Next(outcome)
	}
}

/// Access to the page location, so redirects can be observed in tests.
pub trait Navigator: Send + Sync {
	fn pathname(&self) -> String;
	fn href(&self) -> String;
	fn assign(&self, url: &str);
}

/// `window.location` of the running page.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
	fn pathname(&self) -> String {
		web_sys::window()
			.and_then(|w| w.location().pathname().ok())
			.unwrap_or_default()
	}

	fn href(&self) -> String {
		web_sys::window()
			.and_then(|w| w.location().href().ok())
			.unwrap_or_default()
	}

	fn assign(&self, url: &str) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Err(err) = window.location().set_href(url) {
			warn!("navigation to {url} failed: {err:?}");
		}
	}
}

/// Login URL that returns the user to `current` afterwards.
pub fn login_redirect_url(current: &str) -> String {
	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("redirect", current)
		.finish();
	format!("{LOGIN_PATH}?{query}")
}

/// Sends the browser to the login page when a response says the session is
/// missing. The response itself continues down the pipeline.
pub struct AuthRedirect {
	navigator: Arc<dyn Navigator>,
}

impl AuthRedirect {
	pub fn new(navigator: Arc<dyn Navigator>) -> Self {
		Self { navigator }
	}
}

impl Middleware for AuthRedirect {
	fn handle(&self, request: &ApiRequest, outcome: Outcome) -> Flow {
		if let Ok(response) = &outcome {
			let code = response.body.get("code").and_then(Value::as_i64);
			if code == Some(NOT_LOGGED_IN)
				&& !request.url.contains(CURRENT_USER_MARKER)
				&& !self.navigator.pathname().contains(LOGIN_PATH)
			{
				let target = login_redirect_url(&self.navigator.href());
				info!("session expired, redirecting to {target}");
				self.navigator.assign(&target);
			}
		}
		Flow::Next(outcome)
	}
}

/// Static payloads substituted for failed requests, keyed by exact request URL.
#[derive(Clone, Debug, Default)]
pub struct MockFallback {
	mocks: HashMap<String, Value>,
}

impl MockFallback {
	pub fn new() -> Self {
		Self::default()
	}

	/// Offline stand-ins for the current-user check and the filter endpoint.
	pub fn with_defaults() -> Self {
		Self::new()
			.mock(
				"/api/user/current",
				json!({"code": 0, "data": {"id": 1, "username": "mock"}}),
			)
			.mock("/api/v1/graph/filter", json!({"nodes": [], "links": []}))
	}

	pub fn mock(mut self, url: impl Into<String>, payload: Value) -> Self {
		self.mocks.insert(url.into(), payload);
		self
	}
}

impl Middleware for MockFallback {
	fn handle(&self, request: &ApiRequest, outcome: Outcome) -> Flow {
		match outcome {
			Err(err) => match self.mocks.get(&request.url) {
				Some(payload) => {
					info!("{} failed ({err}), serving mock", request.url);
					Flow::Resolve(ApiResponse {
						status: 200,
						status_text: "OK".to_string(),
						body: payload.clone(),
					})
				}
				None => Flow::Next(Err(err)),
			},
			ok => Flow::Next(ok),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::testing::RecordingNavigator;

	fn ok(body: Value) -> Outcome {
		Ok(ApiResponse {
			status: 200,
			status_text: "OK".into(),
			body,
		})
	}

	fn auth_pipeline(navigator: &Arc<RecordingNavigator>) -> Pipeline {
		Pipeline::new().with(AuthRedirect::new(navigator.clone()))
	}

	#[test]
	fn stages_run_in_order_and_stop_on_short_circuit() {
		struct Tag(&'static str);
		impl Middleware for Tag {
			fn handle(&self, _: &ApiRequest, outcome: Outcome) -> Flow {
				let mut response = outcome.unwrap();
				response.status_text.push_str(self.0);
				Flow::Next(Ok(response))
			}
		}
		struct Stop;
		impl Middleware for Stop {
			fn handle(&self, _: &ApiRequest, _: Outcome) -> Flow {
				Flow::Reject(ApiError::Timeout)
			}
		}

		let request = ApiRequest::get("/x", vec![]);
		let pipeline = Pipeline::new().with(Tag("a")).with(Tag("b"));
		assert_eq!(pipeline.run(&request, ok(Value::Null)).unwrap().status_text, "OKab");

		let pipeline = Pipeline::new().with(Tag("a")).with(Stop).with(Tag("c"));
		assert_eq!(pipeline.run(&request, ok(Value::Null)), Err(ApiError::Timeout));
	}

	#[test]
	fn mock_substitutes_failures_for_exact_url() {
		let pipeline = Pipeline::new().with(MockFallback::with_defaults());
		let request = ApiRequest::get("/api/user/current", vec![]);

		for _ in 0..3 {
			let response = pipeline
				.run(&request, Err(ApiError::Transport("offline".into())))
				.unwrap();
			assert_eq!(response.status, 200);
			assert_eq!(response.status_text, "OK");
			assert_eq!(response.body["data"]["username"], "mock");
		}
	}

	#[test]
	fn mock_ignores_other_urls_and_successes() {
		let pipeline = Pipeline::new().with(MockFallback::with_defaults());

		let near_miss = ApiRequest::get("/api/user/current/", vec![]);
		let err = pipeline
			.run(&near_miss, Err(ApiError::Transport("offline".into())))
			.unwrap_err();
		assert_eq!(err, ApiError::Transport("offline".into()));

		let hit = ApiRequest::get("/api/user/current", vec![]);
		let live = pipeline.run(&hit, ok(json!({"code": 0, "data": null}))).unwrap();
		assert_eq!(live.body["data"], Value::Null);
	}

	#[test]
	fn not_logged_in_redirects_with_return_path() {
		let navigator = Arc::new(RecordingNavigator::at(
			"/kg",
			"http://localhost:3000/kg?focus=p1",
		));
		let request = ApiRequest::get("/graph/root", vec![]);

		let outcome = auth_pipeline(&navigator).run(&request, ok(json!({"code": NOT_LOGGED_IN})));

		assert!(outcome.is_ok());
		assert_eq!(
			navigator.visits(),
			vec!["/user/login?redirect=http%3A%2F%2Flocalhost%3A3000%2Fkg%3Ffocus%3Dp1".to_string()]
		);
	}

	#[test]
	fn no_redirect_on_login_page() {
		let navigator = Arc::new(RecordingNavigator::at(
			"/user/login",
			"http://localhost:3000/user/login",
		));
		let request = ApiRequest::get("/graph/root", vec![]);

		auth_pipeline(&navigator).run(&request, ok(json!({"code": NOT_LOGGED_IN})));

		assert!(navigator.visits().is_empty());
	}

	#[test]
	fn no_redirect_for_current_user_check() {
		let navigator = Arc::new(RecordingNavigator::at("/kg", "http://localhost:3000/kg"));
		let request = ApiRequest::get("/api/user/current", vec![]);

		auth_pipeline(&navigator).run(&request, ok(json!({"code": NOT_LOGGED_IN})));

		assert!(navigator.visits().is_empty());
	}

	#[test]
	fn other_codes_do_not_redirect() {
		let navigator = Arc::new(RecordingNavigator::at("/kg", "http://localhost:3000/kg"));
		let pipeline = auth_pipeline(&navigator);
		let request = ApiRequest::get("/graph/root", vec![]);

		pipeline.run(&request, ok(json!({"code": 0})));
		pipeline.run(&request, ok(json!({"nodes": []})));
		pipeline.run(&request, Err(ApiError::Timeout));

		assert!(navigator.visits().is_empty());
	}
}
