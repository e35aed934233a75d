//! Asynchronous export jobs: create, poll, download.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::http::HttpClient;
use crate::config::ClientConfig;
use crate::error::ApiError;

pub const CREATE_PATH: &str = "/export/file";

/// Polls before the UI stops waiting on a job.
pub const MAX_POLLS: u32 = 30;

pub fn job_path(job_id: &str) -> String {
	format!("/export/job/{job_id}")
}

pub fn download_path(job_id: &str) -> String {
	format!("/export/download/{job_id}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
	Papers,
	Authors,
	Organizations,
	Statistics,
}

impl ExportKind {
	pub const ALL: [ExportKind; 4] = [
		ExportKind::Papers,
		ExportKind::Authors,
		ExportKind::Organizations,
		ExportKind::Statistics,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			ExportKind::Papers => "papers",
			ExportKind::Authors => "authors",
			ExportKind::Organizations => "organizations",
			ExportKind::Statistics => "statistics",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.as_str() == value)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
	#[default]
	Csv,
	Excel,
}

impl ExportFormat {
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"csv" => Some(ExportFormat::Csv),
			"excel" => Some(ExportFormat::Excel),
			_ => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportRequest {
	pub export_type: ExportKind,
	pub format: ExportFormat,
	pub filters: Map<String, Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub fields: Option<Vec<String>>,
}

impl ExportRequest {
	pub fn new(export_type: ExportKind, format: ExportFormat) -> Self {
		Self {
			export_type,
			format,
			filters: Map::new(),
			fields: None,
		}
	}

	/// Add a filter; `None` leaves the request unchanged.
	pub fn filter(mut self, key: &str, value: Option<impl Into<Value>>) -> Self {
		if let Some(value) = value {
			self.filters.insert(key.to_string(), value.into());
		}
		self
	}
}

/// Acknowledgement of a newly queued job.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ExportJob {
	pub job_id: String,
	pub status: ExportState,
	pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportState {
	Pending,
	Running,
	Done,
	Failed,
	#[serde(other)]
	Unknown,
}

impl ExportState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, ExportState::Done | ExportState::Failed)
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ExportStatus {
	pub job_id: String,
	pub status: ExportState,
	pub progress: Option<f64>,
	pub file_path: Option<String>,
	pub download_url: Option<String>,
	pub error_msg: Option<String>,
	#[serde(deserialize_with = "timestamp")]
	pub created_at: NaiveDateTime,
	#[serde(deserialize_with = "timestamp")]
	pub updated_at: NaiveDateTime,
}

/// Accepts RFC 3339 (converted to UTC) or an ISO timestamp without offset.
fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
	let raw = String::deserialize(deserializer)?;
	DateTime::parse_from_rfc3339(&raw)
		.map(|dt| dt.naive_utc())
		.or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f"))
		.or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
		.map_err(serde::de::Error::custom)
}

/// What a poller does after reading a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollStep {
	Finished,
	Again,
	GiveUp,
}

impl PollStep {
	/// `attempt` counts from zero.
	pub fn after(status: &ExportStatus, attempt: u32) -> Self {
		if status.status.is_terminal() {
			PollStep::Finished
		} else if attempt + 1 >= MAX_POLLS {
			PollStep::GiveUp
		} else {
			PollStep::Again
		}
	}
}

#[derive(Clone)]
pub struct ExportApi {
	http: HttpClient,
	config: ClientConfig,
}

impl ExportApi {
	pub fn new(http: HttpClient, config: ClientConfig) -> Self {
		Self { http, config }
	}

	pub async fn create_export(&self, request: &ExportRequest) -> Result<ExportJob, ApiError> {
		self.http.post(CREATE_PATH, request).await
	}

	pub async fn export_status(&self, job_id: &str) -> Result<ExportStatus, ApiError> {
		self.http.get(&job_path(job_id), Vec::new()).await
	}

	/// Absolute URL of the finished file, or `None` while the job is not done.
	pub fn download_link(&self, status: &ExportStatus) -> Option<String> {
		if status.status != ExportState::Done {
			return None;
		}
		let path = status
			.download_url
			.clone()
			.unwrap_or_else(|| download_path(&status.job_id));
		Some(self.config.endpoint(&path))
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use serde_json::json;

	use super::*;
	use crate::api::middleware::Pipeline;
	use crate::api::testing::FakeTransport;

	fn api(transport: &Arc<FakeTransport>) -> ExportApi {
		ExportApi::new(
			HttpClient::with_transport(transport.clone(), Pipeline::new()),
			ClientConfig::new("http://localhost:8000/api/v1").unwrap(),
		)
	}

	fn status(state: &str, download_url: Option<&str>) -> ExportStatus {
		serde_json::from_value(json!({
			"job_id": "j1",
			"status": state,
			"progress": null,
			"download_url": download_url,
			"created_at": "2024-05-01T10:00:00.123456",
			"updated_at": "2024-05-01T10:00:05Z"
		}))
		.unwrap()
	}

	#[tokio::test]
	async fn create_posts_filters_and_format() {
		let transport = Arc::new(FakeTransport::new().respond(
			CREATE_PATH,
			json!({"job_id": "j1", "status": "pending", "message": "queued"}),
		));
		let request = ExportRequest::new(ExportKind::Papers, ExportFormat::Excel)
			.filter("year", Some(2020))
			.filter("keyword", None::<String>);

		let job = api(&transport).create_export(&request).await.unwrap();

		assert_eq!(job.job_id, "j1");
		assert_eq!(job.status, ExportState::Pending);
		assert_eq!(
			transport.requests()[0].body,
			Some(json!({"export_type": "papers", "format": "excel", "filters": {"year": 2020}}))
		);
	}

	#[tokio::test]
	async fn status_reads_job_path() {
		let transport = Arc::new(FakeTransport::new().respond(
			&job_path("j1"),
			json!({
				"job_id": "j1",
				"status": "running",
				"progress": 0.5,
				"created_at": "2024-05-01T10:00:00",
				"updated_at": "2024-05-01T10:00:03+02:00"
			}),
		));

		let status = api(&transport).export_status("j1").await.unwrap();

		assert_eq!(status.status, ExportState::Running);
		assert_eq!(status.progress, Some(0.5));
		assert_eq!(status.updated_at.to_string(), "2024-05-01 08:00:03");
		assert_eq!(transport.requests()[0].url, "/export/job/j1");
	}

	#[tokio::test]
	async fn unknown_job_is_a_status_error() {
		let transport = Arc::new(FakeTransport::new());
		let err = api(&transport).export_status("nope").await.unwrap_err();
		assert_eq!(err.status(), Some(404));
	}

	#[test]
	fn download_link_only_when_done() {
		let transport = Arc::new(FakeTransport::new());
		let api = api(&transport);

		assert_eq!(api.download_link(&status("running", None)), None);
		assert_eq!(
			api.download_link(&status("done", Some("/api/v1/export/download/j1"))).as_deref(),
			Some("http://localhost:8000/api/v1/export/download/j1")
		);
		assert_eq!(
			api.download_link(&status("done", None)).as_deref(),
			Some("http://localhost:8000/api/v1/export/download/j1")
		);
	}

	#[test]
	fn polling_stops_on_terminal_state_or_limit() {
		assert_eq!(PollStep::after(&status("done", None), 0), PollStep::Finished);
		assert_eq!(PollStep::after(&status("failed", None), 3), PollStep::Finished);
		assert_eq!(PollStep::after(&status("pending", None), 0), PollStep::Again);
		assert_eq!(PollStep::after(&status("running", None), MAX_POLLS - 1), PollStep::GiveUp);
		assert_eq!(status("archived", None).status, ExportState::Unknown);
	}

	#[test]
	fn kinds_round_trip_through_their_names() {
		for kind in ExportKind::ALL {
			assert_eq!(ExportKind::parse(kind.as_str()), Some(kind));
		}
		assert_eq!(ExportFormat::parse("excel"), Some(ExportFormat::Excel));
		assert_eq!(ExportFormat::parse("pdf"), None);
	}
}
