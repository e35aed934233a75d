//! Leptos client for a citation knowledge graph: app wiring and routes.

use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod api;
pub mod config;
pub mod error;
pub mod store;

// Modules
mod components;
mod pages;

use crate::api::{BrowserNavigator, ExportApi, GraphApi, HttpClient, StatisticsApi};
use crate::components::nav::NavBar;
use crate::config::ClientConfig;
use crate::store::{PaperCount, load_total_paper_count};

// Top-Level pages
use crate::pages::admin::UserManage;
use crate::pages::data_stats::DataStats;
use crate::pages::home::Home;
use crate::pages::knowledge_graph::KnowledgeGraph;
use crate::pages::not_found::NotFound;
use crate::pages::papers::PaperList;
use crate::pages::user::{UserLogin, UserRegister};

pub use crate::pages::config_error::{ConfigErrorPage, ConfigErrorPageProps};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Root component. Builds the API clients from `config`, provides them and
/// the paper count as context, and starts the paper count load.
#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	info!("API base: {}", config.base_url);
	let http = HttpClient::new(config.clone(), Arc::new(BrowserNavigator));
	let graph_api = GraphApi::new(http.clone());
	let paper_count = PaperCount::new();
	provide_context(graph_api.clone());
	provide_context(StatisticsApi::new(http.clone()));
	provide_context(ExportApi::new(http, config));
	provide_context(paper_count);

	// best effort; the counter stays at zero if this fails
	spawn_local(async move { load_total_paper_count(&graph_api, paper_count).await });

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Citation Knowledge Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<NavBar />
			<main>
				<Routes fallback=|| view! { <NotFound /> }>
					<Route path=path!("/") view=Home />
					<Route path=path!("/user/login") view=UserLogin />
					<Route path=path!("/user/register") view=UserRegister />
					<Route path=path!("/admin/userManage") view=UserManage />
					<Route path=path!("/data-stats") view=DataStats />
					<Route path=path!("/kg") view=KnowledgeGraph />
					<Route path=path!("/papers") view=PaperList />
				</Routes>
			</main>
		</Router>
	}
}
