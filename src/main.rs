use citegraph_web::config::ClientConfig;
use citegraph_web::{App, ConfigErrorPage, init_logging};
use leptos::prelude::*;

fn main() {
	init_logging();
	match ClientConfig::from_env() {
		Ok(config) => mount_to_body(move || view! { <App config=config.clone() /> }),
		Err(err) => {
			log::error!("{err}");
			let message = err.to_string();
			mount_to_body(move || view! { <ConfigErrorPage message=message.clone() /> })
		}
	}
}
