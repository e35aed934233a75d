use leptos::prelude::*;
use leptos_router::components::A;

/// 404 fallback for unknown routes.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<section class="not-found">
			<h1>"Page not found"</h1>
			<A href="/">"Back to the start page"</A>
		</section>
	}
}
