use leptos::prelude::*;

/// User administration. Accounts live in the backend; this page only frames it.
#[component]
pub fn UserManage() -> impl IntoView {
	view! {
		<section class="admin-users">
			<h1>"User management"</h1>
			<p>"Account administration is served by the backend user service."</p>
		</section>
	}
}
