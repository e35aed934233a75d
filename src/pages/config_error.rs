use leptos::prelude::*;

/// Shown instead of the app when the build carries no usable API base URL.
#[component]
pub fn ConfigErrorPage(message: String) -> impl IntoView {
	view! {
		<section class="config-error">
			<h1>"Client is not configured"</h1>
			<pre>{message}</pre>
		</section>
	}
}
