use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::api::GraphApi;
use crate::api::types::{GraphResponse, LayoutPosition, Node, NodeType, RootGraphParams};
use crate::components::force_graph::{ForceGraphCanvas, GraphData, node_color};
use crate::error::ApiError;

/// Nodes requested for the initial view.
const ROOT_LIMIT: u32 = 100;

/// Label and value of each known field of `node`, in display order.
fn detail_rows(node: &Node) -> Vec<(&'static str, String)> {
	let mut rows = vec![("Type", node.node_type.as_str().to_string())];
	let optional = [
		("Title", node.title.clone()),
		("Year", node.year.map(|y| y.to_string())),
		("Venue", node.venue.clone()),
		("DOI", node.doi.clone()),
		("h-index", node.h_index.map(|h| h.to_string())),
		("ORCID", node.orcid.clone()),
		("Country", node.country.clone()),
		("Rank", node.rank.map(|r| r.to_string())),
	];
	rows.extend(optional.into_iter().filter_map(|(k, v)| Some((k, v?))));
	rows
}

fn layout_name(input: &str) -> Option<String> {
	let trimmed = input.trim();
	(!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Interactive graph view: loads the root graph, shows details of a clicked
/// node, expands nodes on double click, and persists positions after a drag.
#[component]
pub fn KnowledgeGraph() -> impl IntoView {
	let api = expect_context::<GraphApi>();
	let response = RwSignal::new(GraphResponse::default());
	let status = RwSignal::new(Ok::<(), ApiError>(()));
	let expand = RwSignal::new(None::<String>);
	let layout = RwSignal::new(Vec::<LayoutPosition>::new());
	let selected = RwSignal::new(None::<String>);
	let detail = RwSignal::new(None::<Result<Node, String>>);
	let name = RwSignal::new(String::new());
	let saved = RwSignal::new(None::<Result<String, String>>);

	let root_api = api.clone();
	spawn_local(async move {
		match root_api
			.fetch_root_graph(&RootGraphParams::with_limit(ROOT_LIMIT))
			.await
		{
			Ok(graph) => {
				info!(
					"root graph: {} nodes, {} edges",
					graph.nodes.len(),
					graph.edges.len()
				);
				response.set(graph);
			}
			Err(err) => status.set(Err(err)),
		}
	});

	let expand_api = api.clone();
	Effect::new(move |_| {
		let Some(node_id) = expand.get() else {
			return;
		};
		let api = expand_api.clone();
		spawn_local(async move {
			match api.fetch_children_graph(&node_id).await {
				Ok(children) => response.update(|graph| graph.merge(children)),
				Err(err) => status.set(Err(err)),
			}
		});
	});

	let detail_api = api.clone();
	Effect::new(move |_| {
		let Some(node_id) = selected.get() else {
			return;
		};
		let api = detail_api.clone();
		detail.set(None);
		spawn_local(async move {
			let node = match api.fetch_node_detail(&node_id).await {
				Ok(raw) => Node::from_raw(&raw).ok_or_else(|| format!("{node_id} has an unknown type")),
				Err(err) => Err(err.to_string()),
			};
			detail.set(Some(node));
		});
	});

	let save_api = api.clone();
	let save_named = move || {
		let Some(layout_name) = layout_name(&name.get_untracked()) else {
			return;
		};
		let positions = layout.get_untracked();
		let api = save_api.clone();
		spawn_local(async move {
			let outcome = match api.persist_named_layout(&layout_name, positions).await {
				Ok(reply) if reply.success => Ok(reply.message),
				Ok(reply) => Err(reply.message),
				Err(err) => Err(err.to_string()),
			};
			saved.set(Some(outcome));
		});
	};

	Effect::new(move |_| {
		let positions = layout.get();
		if positions.is_empty() {
			return;
		}
		let api = api.clone();
		spawn_local(async move {
			if let Err(err) = api.persist_layout(positions).await {
				warn!("layout not saved: {err}");
			}
		});
	});

	let data = Signal::derive(move || response.with(|graph| GraphData::from(graph)));

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=data
				fullscreen=true
				on_expand=expand.write_only()
				on_layout=layout.write_only()
				on_select=selected.write_only()
			/>
			<div class="graph-overlay">
				<h1>"Citation graph"</h1>
				<p class="subtitle">
					"Click a node for details, double-click to expand it. Drag nodes to reposition; positions are saved."
				</p>
				<ul class="legend">
					{[NodeType::Paper, NodeType::Author, NodeType::Organization]
						.into_iter()
						.map(|kind| view! {
							<li>
								<span class="swatch" style=format!("background: {}", node_color(kind)) />
								{kind.as_str()}
							</li>
						})
						.collect_view()}
				</ul>
				<form class="save-layout" on:submit=move |ev| {
					ev.prevent_default();
					save_named();
				}>
					<input
						type="text"
						placeholder="Layout name"
						prop:value=move || name.get()
						on:input=move |ev| name.set(event_target_value(&ev))
					/>
					<button
						type="submit"
						disabled=move || layout.with(|p| p.is_empty()) || layout_name(&name.get()).is_none()
					>
						"Save layout as"
					</button>
					{move || saved.get().map(|outcome| match outcome {
						Ok(message) => view! { <span class="saved">{message}</span> }.into_any(),
						Err(message) => view! { <span class="error">{message}</span> }.into_any(),
					})}
				</form>
				{move || selected.get().map(|_| match detail.get() {
					None => view! { <p class="loading">"Loading node…"</p> }.into_any(),
					Some(Err(err)) => view! { <p class="error">{err}</p> }.into_any(),
					Some(Ok(node)) => view! {
						<aside class="node-detail">
							<h2>{node.label.clone()}</h2>
							<dl>
								{detail_rows(&node)
									.into_iter()
									.map(|(key, value)| view! { <dt>{key}</dt><dd>{value}</dd> })
									.collect_view()}
							</dl>
						</aside>
					}
					.into_any(),
				})}
				<ErrorBoundary fallback=|errors| {
					view! {
						<ul class="errors">
							{move || {
								errors
									.get()
									.into_iter()
									.map(|(_, e)| view! { <li>{e.to_string()}</li> })
									.collect_view()
							}}
						</ul>
					}
				}>{move || status.get()}</ErrorBoundary>
			</div>
		</div>
	}
}
