use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::StatisticsApi;
use crate::api::statistics::{StatisticsQuery, StatisticsResult};
use crate::store::{PAPER_COUNT_FETCH_LIMIT, PaperCount};

const METRICS: &[(&str, &str)] = &[
	("papers_by_year", "Papers per year"),
	("papers_by_venue", "Papers per venue"),
	("authors_by_org", "Authors per organization"),
];

/// Share of the largest value, as a CSS width percentage.
fn bar_width(value: f64, max: f64) -> f64 {
	if max <= 0.0 {
		0.0
	} else {
		(value / max * 100.0).clamp(0.0, 100.0)
	}
}

#[component]
pub fn DataStats() -> impl IntoView {
	let api = expect_context::<StatisticsApi>();
	let paper_count = expect_context::<PaperCount>();
	let metric = RwSignal::new(METRICS[0].0.to_string());
	let result = RwSignal::new(None::<Result<StatisticsResult, String>>);

	Effect::new(move |_| {
		let query = StatisticsQuery::metric(metric.get());
		let api = api.clone();
		result.set(None);
		spawn_local(async move {
			let outcome = api.query_statistics(&query).await.map_err(|e| e.to_string());
			result.set(Some(outcome));
		});
	});

	view! {
		<section class="data-stats">
			<h1>"Statistics"</h1>
			<p class="approximate">
				"Approximately " <strong>{move || paper_count.get()}</strong>
				" papers (counted from the first " {PAPER_COUNT_FETCH_LIMIT} " graph nodes)"
			</p>
			<select on:change=move |ev| metric.set(event_target_value(&ev))>
				{METRICS
					.iter()
					.map(|(key, label)| view! { <option value={*key}>{*label}</option> })
					.collect_view()}
			</select>
			{move || match result.get() {
				None => view! { <p class="loading">"Loading…"</p> }.into_any(),
				Some(Err(err)) => view! { <p class="error">{err}</p> }.into_any(),
				Some(Ok(stats)) => {
					let max = stats.data.iter().map(|p| p.value).fold(0.0, f64::max);
					view! {
						<table class="bars">
							{stats
								.data
								.into_iter()
								.map(|point| view! {
									<tr>
										<td>{point.label}</td>
										<td>
											<div
												class="bar"
												style=format!("width: {}%", bar_width(point.value, max))
											/>
										</td>
										<td>{point.value}</td>
									</tr>
								})
								.collect_view()}
						</table>
						{stats.total.map(|total| view! { <p class="total">"Total: " {total}</p> })}
					}
					.into_any()
				}
			}}
		</section>
	}
}
