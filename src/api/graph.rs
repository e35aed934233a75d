//! Graph endpoints of the backend.

use log::info;
use serde_json::Value;
use url::form_urlencoded;

use super::http::HttpClient;
use super::types::{
	ApiEnvelope, CurrentUser, GraphResponse, LayoutPersistRequest, LayoutPersistResponse,
	LayoutPosition, RawNode, RootGraphParams,
};
use crate::error::ApiError;

pub const ROOT_PATH: &str = "/graph/root";
pub const LAYOUT_PATH: &str = "/graph/layout/persist";
pub const CURRENT_USER_PATH: &str = "/api/user/current";

/// Percent-encode `segment` so it stays a single path segment.
fn encode_segment(segment: &str) -> String {
	// form encoding writes spaces as '+', which means a literal plus in a path
	form_urlencoded::byte_serialize(segment.as_bytes())
		.collect::<String>()
		.replace('+', "%20")
}

pub fn children_path(node_id: &str) -> String {
	format!("/graph/children/{}", encode_segment(node_id))
}

pub fn node_path(node_id: &str) -> String {
	format!("/graph/node/{}", encode_segment(node_id))
}

#[derive(Clone)]
pub struct GraphApi {
	http: HttpClient,
}

impl GraphApi {
	pub fn new(http: HttpClient) -> Self {
		Self { http }
	}

	/// Top-level graph, filtered by `params`. No caching or paging.
	pub async fn fetch_root_graph(
		&self,
		params: &RootGraphParams,
	) -> Result<GraphResponse, ApiError> {
		self.http.get(ROOT_PATH, params.to_query()).await
	}

	/// Subgraph induced by the neighbours of `node_id`.
	pub async fn fetch_children_graph(&self, node_id: &str) -> Result<GraphResponse, ApiError> {
		self.http.get(&children_path(node_id), Vec::new()).await
	}

	pub async fn fetch_node_detail(&self, node_id: &str) -> Result<RawNode, ApiError> {
		self.http.get(&node_path(node_id), Vec::new()).await
	}

	/// Store node coordinates. Whatever the backend answers is discarded.
	pub async fn persist_layout(&self, positions: Vec<LayoutPosition>) -> Result<(), ApiError> {
		let count = positions.len();
		let request = LayoutPersistRequest {
			layout_name: None,
			positions,
		};
		let _: Value = self.http.post(LAYOUT_PATH, &request).await?;
		info!("persisted {count} node positions");
		Ok(())
	}

	pub async fn persist_named_layout(
		&self,
		name: &str,
		positions: Vec<LayoutPosition>,
	) -> Result<LayoutPersistResponse, ApiError> {
		let request = LayoutPersistRequest {
			layout_name: Some(name.to_string()),
			positions,
		};
		self.http.post(LAYOUT_PATH, &request).await
	}

	pub async fn fetch_current_user(&self) -> Result<ApiEnvelope<CurrentUser>, ApiError> {
		self.http.get(CURRENT_USER_PATH, Vec::new()).await
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use serde_json::json;

	use super::*;
	use crate::api::http::Method;
	use crate::api::middleware::{MockFallback, Pipeline};
	use crate::api::testing::FakeTransport;
	use crate::config::ClientConfig;

	fn api(transport: &Arc<FakeTransport>) -> GraphApi {
		GraphApi::new(HttpClient::with_transport(transport.clone(), Pipeline::new()))
	}

	#[test]
	fn node_ids_are_encoded_as_one_segment() {
		assert_eq!(children_path("abc"), "/graph/children/abc");
		assert_eq!(children_path("4:x/y z"), "/graph/children/4%3Ax%2Fy%20z");
		assert_eq!(node_path("a+b"), "/graph/node/a%2Bb");
	}

	#[tokio::test]
	async fn root_graph_keeps_arrays_as_sent() {
		let payload = json!({
			"nodes": [
				{"id": "p2", "label": "Paper", "properties": {"year": "2019"}, "score": 0.7},
				{"id": "a1", "label": "Author", "properties": {}},
				{"id": "p1", "type": "Paper", "community": 4}
			],
			"edges": [
				{"id": "e1", "source": "a1", "target": "p2", "type": "AUTHORED", "properties": {}, "weight": 2}
			]
		});
		let transport = Arc::new(FakeTransport::new().respond(ROOT_PATH, payload.clone()));

		let graph = api(&transport)
			.fetch_root_graph(&RootGraphParams::with_limit(3))
			.await
			.unwrap();

		assert_eq!(serde_json::to_value(&graph).unwrap(), payload);
		let sent = &transport.requests()[0];
		assert_eq!(sent.url, "/graph/root");
		assert_eq!(sent.query, vec![("limit".to_string(), "3".to_string())]);
	}

	#[tokio::test]
	async fn children_graph_hits_node_path() {
		let transport = Arc::new(
			FakeTransport::new().respond("/graph/children/abc", json!({"nodes": [], "edges": []})),
		);

		let graph = api(&transport).fetch_children_graph("abc").await.unwrap();

		assert!(graph.nodes.is_empty());
		assert_eq!(transport.requests()[0].url, "/graph/children/abc");
	}

	#[tokio::test]
	async fn persist_layout_posts_positions() {
		let transport = Arc::new(
			FakeTransport::new().respond(LAYOUT_PATH, json!({"success": true, "message": "ok"})),
		);
		let positions = vec![LayoutPosition {
			node_id: "p1".into(),
			x: 10.0,
			y: -4.5,
		}];

		api(&transport).persist_layout(positions).await.unwrap();

		let sent = &transport.requests()[0];
		assert_eq!(sent.method, Method::Post);
		assert_eq!(
			sent.body,
			Some(json!({"positions": [{"node_id": "p1", "x": 10.0, "y": -4.5}]}))
		);
	}

	#[tokio::test]
	async fn persist_layout_ignores_empty_response() {
		let transport = Arc::new(FakeTransport::new().respond(LAYOUT_PATH, Value::Null));
		assert!(api(&transport).persist_layout(Vec::new()).await.is_ok());
	}

	#[tokio::test]
	async fn named_layout_returns_confirmation() {
		let transport = Arc::new(
			FakeTransport::new().respond(LAYOUT_PATH, json!({"success": true, "message": "saved"})),
		);

		let confirmation = api(&transport)
			.persist_named_layout("draft", Vec::new())
			.await
			.unwrap();

		assert!(confirmation.success);
		assert_eq!(transport.requests()[0].body.as_ref().unwrap()["layout_name"], "draft");
	}

	#[tokio::test]
	async fn current_user_falls_back_to_mock_when_offline() {
		let transport = Arc::new(
			FakeTransport::new().fail(CURRENT_USER_PATH, ApiError::Transport("offline".into())),
		);
		let http = HttpClient::with_transport(
			transport,
			Pipeline::new().with(MockFallback::with_defaults()),
		);

		let envelope = GraphApi::new(http).fetch_current_user().await.unwrap();

		assert_eq!(envelope.code, 0);
		assert_eq!(envelope.data.unwrap().username, "mock");
	}

	#[tokio::test]
	async fn current_user_is_requested_outside_the_versioned_base() {
		let transport = Arc::new(
			FakeTransport::new()
				.respond(CURRENT_USER_PATH, json!({"code": 0, "data": {"id": 7, "username": "ada"}})),
		);

		let envelope = api(&transport).fetch_current_user().await.unwrap();

		assert_eq!(envelope.data.unwrap().username, "ada");
		let config = ClientConfig::new("http://localhost:8000/api/v1").unwrap();
		assert_eq!(
			config.endpoint(&transport.requests()[0].url),
			"http://localhost:8000/api/user/current"
		);
		assert_eq!(
			config.endpoint(ROOT_PATH),
			"http://localhost:8000/api/v1/graph/root"
		);
	}

	#[tokio::test]
	async fn root_graph_failure_propagates() {
		let transport = Arc::new(FakeTransport::new());
		let err = api(&transport)
			.fetch_root_graph(&RootGraphParams::default())
			.await
			.unwrap_err();
		assert!(matches!(err, ApiError::Status { status: 404, .. }));
	}
}
