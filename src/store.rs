//! App-wide paper count, provided as Leptos context.

use leptos::prelude::*;
use log::{error, info};

use crate::api::GraphApi;
use crate::api::types::{GraphResponse, RootGraphParams};

/// Nodes fetched for the count. Graphs with more papers than this are
/// undercounted; the value is an approximation, not a total.
pub const PAPER_COUNT_FETCH_LIMIT: u32 = 200;

/// Approximate number of papers in the graph. Zero until loaded.
#[derive(Clone, Copy, Debug)]
pub struct PaperCount(RwSignal<usize>);

impl PaperCount {
	pub fn new() -> Self {
		Self(RwSignal::new(0))
	}

	pub fn get(&self) -> usize {
		self.0.get()
	}

	pub fn set(&self, count: usize) {
		self.0.set(count);
	}
}

impl Default for PaperCount {
	fn default() -> Self {
		Self::new()
	}
}

pub fn count_papers(graph: &GraphResponse) -> usize {
	graph.nodes.iter().filter(|n| n.is_paper()).count()
}

/// Fetch a bounded root graph and store its paper count. Failures are logged
/// and leave the previous value in place.
pub async fn load_total_paper_count(api: &GraphApi, store: PaperCount) {
	let params = RootGraphParams::with_limit(PAPER_COUNT_FETCH_LIMIT);
	match api.fetch_root_graph(&params).await {
		Ok(graph) => {
			let count = count_papers(&graph);
			store.set(count);
			info!("paper count loaded: {count}");
		}
		Err(err) => error!("loading paper count failed: {err}"),
	}
}
