use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use leptos_router::hooks::use_query_map;
use log::info;

use crate::api::GraphApi;
use crate::api::types::{ApiEnvelope, CurrentUser};

/// The signed-in user, if the envelope reports success with a payload.
fn signed_in(envelope: ApiEnvelope<CurrentUser>) -> Option<CurrentUser> {
	if envelope.code == 0 { envelope.data } else { None }
}

/// Login page. Reached directly or through an auth redirect carrying
/// `?redirect=<url>`. Checks the current session on load.
#[component]
pub fn UserLogin() -> impl IntoView {
	let api = expect_context::<GraphApi>();
	let query = use_query_map();
	let redirect = move || query.with(|q| q.get("redirect"));
	let user = RwSignal::new(None::<CurrentUser>);

	spawn_local(async move {
		match api.fetch_current_user().await {
			Ok(envelope) => user.set(signed_in(envelope)),
			Err(err) => info!("no current session: {err}"),
		}
	});

	view! {
		<section class="user-login">
			<h1>"Sign in"</h1>
			{move || match user.get() {
				Some(current) => view! {
					<p class="session">"Signed in as " <strong>{current.username}</strong></p>
				}
				.into_any(),
				None => view! { <p>"Your session has expired or you are not signed in."</p> }.into_any(),
			}}
			{move || redirect().map(|target| view! {
				<p class="redirect-hint">"After signing in you will return to " <code>{target}</code></p>
			})}
			<A href="/user/register">"Create an account"</A>
		</section>
	}
}

#[component]
pub fn UserRegister() -> impl IntoView {
	view! {
		<section class="user-register">
			<h1>"Register"</h1>
			<p>"Registration is handled by the backend user service."</p>
			<A href="/user/login">"Already have an account? Sign in"</A>
		</section>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn envelope(code: i64, data: Option<CurrentUser>) -> ApiEnvelope<CurrentUser> {
		ApiEnvelope {
			code,
			data,
			message: None,
		}
	}

	#[test]
	fn session_needs_success_code_and_user() {
		let ada = CurrentUser {
			id: 1,
			username: "ada".into(),
		};
		assert_eq!(signed_in(envelope(0, Some(ada.clone()))), Some(ada.clone()));
		assert_eq!(signed_in(envelope(0, None)), None);
		assert_eq!(signed_in(envelope(40100, Some(ada))), None);
	}
}
