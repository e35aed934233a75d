use leptos::prelude::*;
use leptos_router::components::A;

use crate::store::{PAPER_COUNT_FETCH_LIMIT, PaperCount};

fn count_tooltip() -> String {
	format!("counted from the first {PAPER_COUNT_FETCH_LIMIT} nodes")
}

/// Top navigation bar, with the approximate paper count on the right.
#[component]
pub fn NavBar() -> impl IntoView {
	let paper_count = use_context::<PaperCount>();

	view! {
		<nav class="top-nav">
			<A href="/">"Home"</A>
			<A href="/kg">"Knowledge graph"</A>
			<A href="/papers">"Papers"</A>
			<A href="/data-stats">"Statistics"</A>
			<A href="/admin/userManage">"Users"</A>
			<span class="spacer" />
			{move || paper_count.map(|count| view! {
				<span class="paper-count" title=count_tooltip()>
					"~" {count.get()} " papers"
				</span>
			})}
			<A href="/user/login">"Sign in"</A>
		</nav>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tooltip_follows_fetch_limit() {
		assert_eq!(
			count_tooltip(),
			format!("counted from the first {} nodes", PAPER_COUNT_FETCH_LIMIT)
		);
		assert!(count_tooltip().contains(&PAPER_COUNT_FETCH_LIMIT.to_string()));
	}
}
