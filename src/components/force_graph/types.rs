use crate::api::types::{Edge, GraphResponse, Node, NodeType, Relation};

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: Option<String>,
	pub node_type: NodeType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub relation: Relation,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl From<&GraphResponse> for GraphData {
	/// Nodes of unknown kind and edges of unknown relation are left out.
	fn from(graph: &GraphResponse) -> Self {
		let nodes = graph
			.nodes
			.iter()
			.filter_map(Node::from_raw)
			.map(|node| GraphNode {
				id: node.id,
				label: Some(node.label),
				node_type: node.node_type,
			})
			.collect();
		let links = graph
			.edges
			.iter()
			.filter_map(Edge::from_raw)
			.map(|edge| GraphLink {
				source: edge.source,
				target: edge.target,
				relation: edge.relation,
			})
			.collect();
		Self { nodes, links }
	}
}
