use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::types::GraphData;
use crate::api::types::{LayoutPosition, NodeType, Relation};

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;
/// Distance from the parent at which expanded children are dropped in.
const SPAWN_RADIUS: f64 = 60.0;

pub fn node_color(node_type: NodeType) -> &'static str {
	match node_type {
		NodeType::Paper => "#1f77b4",
		NodeType::Author => "#ff7f0e",
		NodeType::Organization => "#2ca02c",
	}
}

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: String,
	pub label: Option<String>,
	pub node_type: NodeType,
	pub color: String,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	/// Set once the pointer has actually moved the node.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
	delay_t: f64,
}

/// What letting go of the mouse button amounted to.
#[derive(Clone, Debug, PartialEq)]
pub enum Release {
	/// A node was dragged; carries every node position.
	Moved(Vec<LayoutPosition>),
	/// A node was pressed and released in place.
	Clicked(String),
	Nothing,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
	edges: HashMap<(DefaultNodeIdx, DefaultNodeIdx), Relation>,
}

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut state = Self {
			graph,
			id_to_idx: HashMap::new(),
			edges: HashMap::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
		};
		state.merge(data);
		state
	}

	pub fn node_count(&self) -> usize {
		self.id_to_idx.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Add nodes and links not simulated yet. New nodes linked to an existing
	/// one start on a ring around it; the rest start on a ring around the origin.
	pub fn merge(&mut self, data: &GraphData) {
		let positions: HashMap<DefaultNodeIdx, (f64, f64)> = self.positions_by_idx();
		let fresh: Vec<_> = data
			.nodes
			.iter()
			.filter(|n| !self.id_to_idx.contains_key(&n.id))
			.collect();
		let total = fresh.len().max(1) as f64;

		for (i, node) in fresh.into_iter().enumerate() {
			let anchor = data
				.links
				.iter()
				.filter_map(|l| {
					if l.source == node.id {
						self.id_to_idx.get(&l.target)
					} else if l.target == node.id {
						self.id_to_idx.get(&l.source)
					} else {
						None
					}
				})
				.find_map(|idx| positions.get(idx).copied());
			let angle = (i as f64) * 2.0 * PI / total;
			let ((cx, cy), radius) = match anchor {
				Some(center) => (center, SPAWN_RADIUS),
				None => ((0.0, 0.0), 100.0),
			};

			let idx = self.graph.add_node(NodeData {
				x: (cx + radius * angle.cos()) as f32,
				y: (cy + radius * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					node_type: node.node_type,
					color: node_color(node.node_type).into(),
				},
			});
			self.id_to_idx.insert(node.id.clone(), idx);
		}

		for link in &data.links {
			if let (Some(&src), Some(&tgt)) = (
				self.id_to_idx.get(&link.source),
				self.id_to_idx.get(&link.target),
			) {
				if src == tgt || self.edges.contains_key(&(src, tgt)) {
					continue;
				}
				self.graph.add_edge(src, tgt, EdgeData::default());
				self.edges.insert((src, tgt), link.relation);
			}
		}
	}

	fn positions_by_idx(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	/// Current coordinates of every node, in graph space.
	pub fn positions(&self) -> Vec<LayoutPosition> {
		let mut out = Vec::with_capacity(self.node_count());
		self.graph.visit_nodes(|node| {
			out.push(LayoutPosition {
				node_id: node.data.user_data.id.clone(),
				x: node.x() as f64,
				y: node.y() as f64,
			});
		});
		out
	}

	pub fn node_id(&self, idx: DefaultNodeIdx) -> Option<String> {
		self.id_to_idx
			.iter()
			.find(|(_, i)| **i == idx)
			.map(|(id, _)| id.clone())
	}

	pub fn relation(&self, src: DefaultNodeIdx, tgt: DefaultNodeIdx) -> Option<Relation> {
		self.edges.get(&(src, tgt)).copied()
	}

	/// End any drag or pan in progress.
	pub fn release_pointer(&mut self) -> Release {
		let release = match (self.drag.active, self.drag.node_idx) {
			(true, Some(_)) if self.drag.moved => Release::Moved(self.positions()),
			(true, Some(idx)) => self.node_id(idx).map_or(Release::Nothing, Release::Clicked),
			_ => Release::Nothing,
		};
		self.drag.active = false;
		self.drag.moved = false;
		self.drag.node_idx = None;
		self.pan.active = false;
		release
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for &(src, tgt) in self.edges.keys() {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	fn node(id: &str, node_type: NodeType) -> GraphNode {
		GraphNode {
			id: id.into(),
			label: Some(id.to_uppercase()),
			node_type,
		}
	}

	fn link(source: &str, target: &str, relation: Relation) -> GraphLink {
		GraphLink {
			source: source.into(),
			target: target.into(),
			relation,
		}
	}

	fn sample() -> GraphData {
		GraphData {
			nodes: vec![
				node("p1", NodeType::Paper),
				node("p2", NodeType::Paper),
				node("a1", NodeType::Author),
			],
			links: vec![
				link("p1", "p2", Relation::Cites),
				link("a1", "p1", Relation::Authored),
				link("a1", "ghost", Relation::Authored),
			],
		}
	}

	#[test]
	fn builds_graph_and_skips_dangling_links() {
		let state = ForceGraphState::new(&sample(), 800.0, 600.0);
		assert_eq!(state.node_count(), 3);
		assert_eq!(state.edge_count(), 2);
		assert_eq!(state.positions().len(), 3);
	}

	#[test]
	fn merge_adds_only_new_nodes_near_parent() {
		let mut state = ForceGraphState::new(&sample(), 800.0, 600.0);
		let expansion = GraphData {
			nodes: vec![node("p1", NodeType::Paper), node("o1", NodeType::Organization)],
			links: vec![
				link("a1", "o1", Relation::AffiliatedWith),
				link("p1", "p2", Relation::Cites),
			],
		};

		state.merge(&expansion);

		assert_eq!(state.node_count(), 4);
		assert_eq!(state.edge_count(), 3);
		let positions = state.positions();
		let find = |id: &str| positions.iter().find(|p| p.node_id == id).unwrap().clone();
		let (a1, o1) = (find("a1"), find("o1"));
		let dist = ((a1.x - o1.x).powi(2) + (a1.y - o1.y).powi(2)).sqrt();
		assert!((dist - SPAWN_RADIUS).abs() < 1e-3, "spawned {dist} away");
	}

	#[test]
	fn release_tells_click_from_drag() {
		let mut state = ForceGraphState::new(&sample(), 800.0, 600.0);
		let p2 = state.id_to_idx["p2"];

		assert_eq!(state.release_pointer(), Release::Nothing);

		state.drag.active = true;
		state.drag.node_idx = Some(p2);
		assert_eq!(state.release_pointer(), Release::Clicked("p2".into()));
		assert!(!state.drag.active);

		state.drag.active = true;
		state.drag.node_idx = Some(p2);
		state.drag.moved = true;
		match state.release_pointer() {
			Release::Moved(positions) => assert_eq!(positions.len(), 3),
			other => panic!("expected positions, got {other:?}"),
		}
		assert_eq!(state.drag.node_idx, None);
	}

	#[test]
	fn hover_highlights_neighbours() {
		let mut state = ForceGraphState::new(&sample(), 800.0, 600.0);
		let p1 = state.id_to_idx["p1"];
		let p2 = state.id_to_idx["p2"];
		let a1 = state.id_to_idx["a1"];

		state.set_hover(Some(p1));

		assert!(state.is_hovered(p1));
		assert!(state.is_highlighted(p2));
		assert!(state.is_highlighted(a1));
		assert_eq!(state.relation(p1, p2), Some(Relation::Cites));
		assert_eq!(state.relation(p2, p1), None);
		assert_eq!(state.node_id(a1).as_deref(), Some("a1"));
	}
}
