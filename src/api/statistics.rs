//! Aggregate statistics endpoint behind the data-stats page.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::http::HttpClient;
use crate::error::ApiError;

pub const QUERY_PATH: &str = "/statistics/query";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatisticsQuery {
	pub metric: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub start_year: Option<i32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end_year: Option<i32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub group_by: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub limit: Option<u32>,
}

impl StatisticsQuery {
	pub fn metric(metric: impl Into<String>) -> Self {
		Self {
			metric: metric.into(),
			start_year: None,
			end_year: None,
			group_by: None,
			limit: None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DataPoint {
	pub label: String,
	pub value: f64,
	#[serde(default)]
	pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StatisticsResult {
	pub metric: String,
	#[serde(default)]
	pub data: Vec<DataPoint>,
	pub total: Option<u64>,
}

#[derive(Clone)]
pub struct StatisticsApi {
	http: HttpClient,
}

impl StatisticsApi {
	pub fn new(http: HttpClient) -> Self {
		Self { http }
	}

	pub async fn query_statistics(
		&self,
		query: &StatisticsQuery,
	) -> Result<StatisticsResult, ApiError> {
		self.http.post(QUERY_PATH, query).await
	}
}
