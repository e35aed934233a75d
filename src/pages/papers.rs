use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::GraphApi;
use crate::api::types::{GraphResponse, Node, RootGraphParams};
use crate::components::export_panel::ExportPanel;

const LIST_LIMIT: u32 = 200;

/// Paper nodes of `graph`, newest first. Papers without a year go last.
pub fn paper_rows(graph: &GraphResponse) -> Vec<Node> {
	let mut papers: Vec<Node> = graph
		.nodes
		.iter()
		.filter(|n| n.is_paper())
		.filter_map(Node::from_raw)
		.collect();
	papers.sort_by(|a, b| b.year.cmp(&a.year));
	papers
}

fn parse_year(input: &str) -> Option<i32> {
	input.trim().parse().ok()
}

fn non_empty(input: &str) -> Option<String> {
	let trimmed = input.trim();
	(!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Filterable list of papers from the root graph.
#[component]
pub fn PaperList() -> impl IntoView {
	let api = expect_context::<GraphApi>();
	let papers = RwSignal::new(None::<Result<Vec<Node>, String>>);
	let year_start = RwSignal::new(String::new());
	let year_end = RwSignal::new(String::new());
	let author = RwSignal::new(String::new());

	let load = move || {
		let api = api.clone();
		let params = RootGraphParams {
			limit: Some(LIST_LIMIT),
			year_start: parse_year(&year_start.get_untracked()),
			year_end: parse_year(&year_end.get_untracked()),
			orgs: Vec::new(),
			author: non_empty(&author.get_untracked()),
		};
		papers.set(None);
		spawn_local(async move {
			let result = api
				.fetch_root_graph(&params)
				.await
				.map(|graph| paper_rows(&graph))
				.map_err(|err| err.to_string());
			papers.set(Some(result));
		});
	};
	load();
	let reload = load.clone();

	view! {
		<section class="paper-list">
			<h1>"Papers"</h1>
			<form on:submit=move |ev| {
				ev.prevent_default();
				reload();
			}>
				<input
					type="number"
					placeholder="From year"
					prop:value=move || year_start.get()
					on:input=move |ev| year_start.set(event_target_value(&ev))
				/>
				<input
					type="number"
					placeholder="To year"
					prop:value=move || year_end.get()
					on:input=move |ev| year_end.set(event_target_value(&ev))
				/>
				<input
					type="text"
					placeholder="Author"
					prop:value=move || author.get()
					on:input=move |ev| author.set(event_target_value(&ev))
				/>
				<button type="submit">"Filter"</button>
			</form>
			<ExportPanel />
			{move || match papers.get() {
				None => view! { <p class="loading">"Loading…"</p> }.into_any(),
				Some(Err(err)) => view! { <p class="error">{err}</p> }.into_any(),
				Some(Ok(rows)) if rows.is_empty() => {
					view! { <p class="empty">"No papers match."</p> }.into_any()
				}
				Some(Ok(rows)) => view! {
					<table>
						<thead>
							<tr><th>"Title"</th><th>"Year"</th><th>"Venue"</th><th>"DOI"</th></tr>
						</thead>
						<tbody>
							{rows
								.into_iter()
								.map(|paper| view! {
									<tr>
										<td>{paper.label}</td>
										<td>{paper.year.map(|y| y.to_string()).unwrap_or_default()}</td>
										<td>{paper.venue.unwrap_or_default()}</td>
										<td>{paper.doi.unwrap_or_default()}</td>
									</tr>
								})
								.collect_view()}
						</tbody>
					</table>
				}
				.into_any(),
			}}
		</section>
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn rows_are_papers_newest_first() {
		let graph: GraphResponse = serde_json::from_value(json!({
			"nodes": [
				{"id": "p1", "label": "Paper", "properties": {"title": "Old", "year": 1999}},
				{"id": "a1", "label": "Author", "properties": {"name": "Ada"}},
				{"id": "p2", "label": "Paper", "properties": {"title": "Undated"}},
				{"id": "p3", "label": "Paper", "properties": {"title": "New", "year": 2021}}
			],
			"edges": []
		}))
		.unwrap();

		let titles: Vec<_> = paper_rows(&graph).into_iter().map(|p| p.label).collect();

		assert_eq!(titles, ["New", "Old", "Undated"]);
	}

	#[test]
	fn filter_inputs_are_trimmed() {
		assert_eq!(parse_year(" 2018 "), Some(2018));
		assert_eq!(parse_year("soon"), None);
		assert_eq!(non_empty("  "), None);
		assert_eq!(non_empty(" Hinton "), Some("Hinton".to_string()));
	}
}
