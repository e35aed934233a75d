use leptos::prelude::*;
use leptos_router::components::A;

use crate::store::{PAPER_COUNT_FETCH_LIMIT, PaperCount};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let paper_count = expect_context::<PaperCount>();

	view! {
		<section class="home">
			<h1>"Citation Knowledge Graph"</h1>
			<p class="subtitle">
				"Papers, authors and organizations, linked by authorship, affiliation and citation."
			</p>
			<p class="stat">
				<strong>{move || paper_count.get()}</strong>
				" papers among the first "
				{PAPER_COUNT_FETCH_LIMIT}
				" graph nodes"
			</p>
			<ul class="entry-points">
				<li><A href="/kg">"Explore the graph"</A></li>
				<li><A href="/papers">"Browse papers"</A></li>
				<li><A href="/data-stats">"See statistics"</A></li>
			</ul>
		</section>
	}
}
