//! Wire types exchanged with the graph backend.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of vertex in the citation graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
	Paper,
	Author,
	Organization,
}

impl NodeType {
	pub fn parse(label: &str) -> Option<Self> {
		match label {
			"Paper" => Some(NodeType::Paper),
			"Author" => Some(NodeType::Author),
			"Organization" => Some(NodeType::Organization),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			NodeType::Paper => "Paper",
			NodeType::Author => "Author",
			NodeType::Organization => "Organization",
		}
	}
}

/// Kind of directed edge between two nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
	Authored,
	AffiliatedWith,
	Cites,
}

impl Relation {
	pub fn parse(kind: &str) -> Option<Self> {
		match kind {
			"AUTHORED" => Some(Relation::Authored),
			"AFFILIATED_WITH" => Some(Relation::AffiliatedWith),
			"CITES" => Some(Relation::Cites),
			_ => None,
		}
	}
}

/// Node as the backend sends it: a label plus a free-form property bag.
/// Every field is optional on the wire, and keys this client does not know
/// about are kept in `extra` so the node serializes back as received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub id: String,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub label: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<Map<String, Value>>,
	/// Some endpoints tag the node kind separately from its label.
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub node_type: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl RawNode {
	pub fn is_paper(&self) -> bool {
		self.label == "Paper"
			|| self.node_type.as_deref() == Some("Paper")
			|| self.str_prop("type").as_deref() == Some("Paper")
	}

	fn str_prop(&self, key: &str) -> Option<String> {
		self.properties
			.as_ref()?
			.get(key)
			.and_then(Value::as_str)
			.map(str::to_string)
	}

	fn i64_prop(&self, key: &str) -> Option<i64> {
		self.properties.as_ref()?.get(key).and_then(Value::as_i64)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub id: String,
	#[serde(default)]
	pub source: String,
	#[serde(default)]
	pub target: String,
	#[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
	pub kind: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<Map<String, Value>>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Unit of transfer for graph endpoints. Order is kept as received.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphResponse {
	#[serde(default)]
	pub nodes: Vec<RawNode>,
	#[serde(default)]
	pub edges: Vec<RawEdge>,
}

impl GraphResponse {
	/// Append nodes and edges from `other` whose ids are not present yet.
	/// Entries without an id cannot be matched and are always appended.
	pub fn merge(&mut self, other: GraphResponse) {
		let node_ids: HashSet<String> = self.nodes.iter().map(|n| n.id.clone()).collect();
		let edge_ids: HashSet<String> = self.edges.iter().map(|e| e.id.clone()).collect();
		self.nodes.extend(
			other
				.nodes
				.into_iter()
				.filter(|n| n.id.is_empty() || !node_ids.contains(&n.id)),
		);
		self.edges.extend(
			other
				.edges
				.into_iter()
				.filter(|e| e.id.is_empty() || !edge_ids.contains(&e.id)),
		);
	}
}

/// Typed view of a [`RawNode`], with domain fields lifted out of `properties`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub node_type: NodeType,
	pub title: Option<String>,
	pub year: Option<i64>,
	pub venue: Option<String>,
	pub doi: Option<String>,
	pub h_index: Option<i64>,
	pub orcid: Option<String>,
	pub country: Option<String>,
	pub rank: Option<i64>,
}

impl Node {
	/// `None` when the raw label names no known node kind.
	pub fn from_raw(raw: &RawNode) -> Option<Self> {
		let node_type = NodeType::parse(&raw.label)
			.or_else(|| raw.node_type.as_deref().and_then(NodeType::parse))?;
		let title = raw.str_prop("title");
		let label = title
			.clone()
			.or_else(|| raw.str_prop("name"))
			.unwrap_or_else(|| raw.id.clone());
		Some(Self {
			id: raw.id.clone(),
			label,
			node_type,
			title,
			year: raw.i64_prop("year"),
			venue: raw.str_prop("venue"),
			doi: raw.str_prop("doi"),
			h_index: raw.i64_prop("h_index").or_else(|| raw.i64_prop("hIndex")),
			orcid: raw.str_prop("orcid"),
			country: raw.str_prop("country"),
			rank: raw.i64_prop("rank"),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	pub source: String,
	pub target: String,
	pub relation: Relation,
}

impl Edge {
	pub fn from_raw(raw: &RawEdge) -> Option<Self> {
		Some(Self {
			source: raw.source.clone(),
			target: raw.target.clone(),
			relation: Relation::parse(&raw.kind)?,
		})
	}
}

/// Filters for the top-level graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootGraphParams {
	pub limit: Option<u32>,
	pub year_start: Option<i32>,
	pub year_end: Option<i32>,
	pub orgs: Vec<String>,
	pub author: Option<String>,
}

impl RootGraphParams {
	pub fn with_limit(limit: u32) -> Self {
		Self {
			limit: Some(limit),
			..Self::default()
		}
	}

	/// Query pairs in backend naming; unset filters are left out.
	pub fn to_query(&self) -> Vec<(String, String)> {
		let mut query = Vec::new();
		if let Some(limit) = self.limit {
			query.push(("limit".to_string(), limit.to_string()));
		}
		if let Some(start) = self.year_start {
			query.push(("yearStart".to_string(), start.to_string()));
		}
		if let Some(end) = self.year_end {
			query.push(("yearEnd".to_string(), end.to_string()));
		}
		if !self.orgs.is_empty() {
			query.push(("orgs".to_string(), self.orgs.join(",")));
		}
		if let Some(author) = &self.author {
			query.push(("author".to_string(), author.clone()));
		}
		query
	}
}

/// Screen position of one node, in graph space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutPosition {
	pub node_id: String,
	pub x: f64,
	pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutPersistRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub layout_name: Option<String>,
	pub positions: Vec<LayoutPosition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutPersistResponse {
	pub success: bool,
	pub message: String,
}

/// `{code, data, message}` envelope used by the user endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
	pub code: i64,
	pub data: Option<T>,
	#[serde(default)]
	pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
	pub id: i64,
	pub username: String,
}
