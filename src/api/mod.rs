//! Client for the knowledge-graph backend.

pub mod export;
pub mod graph;
pub mod http;
pub mod middleware;
pub mod statistics;
pub mod types;

pub use export::ExportApi;
pub use graph::GraphApi;
pub use http::{ApiRequest, ApiResponse, HttpClient, Transport};
pub use middleware::{BrowserNavigator, Navigator};
pub use statistics::StatisticsApi;

#[cfg(test)]
pub(crate) mod testing {
	use std::collections::HashMap;
	use std::sync::Mutex;

	use async_trait::async_trait;
	use serde_json::Value;

	use super::http::{ApiRequest, ApiResponse, Transport};
	use super::middleware::Navigator;
	use crate::error::ApiError;

	/// Canned responses by request URL; anything else answers 404.
	#[derive(Default)]
	pub struct FakeTransport {
		routes: HashMap<String, Result<Value, ApiError>>,
		requests: Mutex<Vec<ApiRequest>>,
	}

	impl FakeTransport {
		pub fn new() -> Self {
			Self::default()
		}

		pub fn respond(mut self, url: &str, body: Value) -> Self {
			self.routes.insert(url.to_string(), Ok(body));
			self
		}

		pub fn fail(mut self, url: &str, err: ApiError) -> Self {
			self.routes.insert(url.to_string(), Err(err));
			self
		}

		pub fn requests(&self) -> Vec<ApiRequest> {
			self.requests.lock().unwrap().clone()
		}
	}

	#[async_trait(?Send)]
	impl Transport for FakeTransport {
		async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
			self.requests.lock().unwrap().push(request.clone());
			match self.routes.get(&request.url) {
				Some(Ok(body)) => Ok(ApiResponse {
					status: 200,
					status_text: "OK".into(),
					body: body.clone(),
				}),
				Some(Err(err)) => Err(err.clone()),
				None => Err(ApiError::Status {
					status: 404,
					body: "not found".into(),
				}),
			}
		}
	}

	pub struct RecordingNavigator {
		pathname: String,
		href: String,
		visits: Mutex<Vec<String>>,
	}

	impl RecordingNavigator {
		pub fn at(pathname: &str, href: &str) -> Self {
			Self {
				pathname: pathname.to_string(),
				href: href.to_string(),
				visits: Mutex::new(Vec::new()),
			}
		}

		pub fn visits(&self) -> Vec<String> {
			self.visits.lock().unwrap().clone()
		}
	}

	impl Navigator for RecordingNavigator {
		fn pathname(&self) -> String {
			self.pathname.clone()
		}

		fn href(&self) -> String {
			self.href.clone()
		}

		fn assign(&self, url: &str) {
			self.visits.lock().unwrap().push(url.to_string());
		}
	}
}
