use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::api::ExportApi;
use crate::api::export::{ExportFormat, ExportKind, ExportRequest, ExportState, ExportStatus, PollStep};

const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, PartialEq)]
enum JobView {
	Idle,
	Waiting(Option<ExportStatus>),
	Ready(ExportStatus),
	Failed(String),
}

fn export_request(kind: &str, format: &str, year: &str, keyword: &str) -> ExportRequest {
	let keyword = keyword.trim();
	ExportRequest::new(
		ExportKind::parse(kind).unwrap_or(ExportKind::Papers),
		ExportFormat::parse(format).unwrap_or_default(),
	)
	.filter("year", year.trim().parse::<i32>().ok())
	.filter("keyword", (!keyword.is_empty()).then(|| keyword.to_string()))
}

fn poll(api: ExportApi, job_id: String, job: RwSignal<JobView>, attempt: u32) {
	spawn_local(async move {
		match api.export_status(&job_id).await {
			Ok(status) => match PollStep::after(&status, attempt) {
				PollStep::Finished if status.status == ExportState::Failed => job.set(JobView::Failed(
					status.error_msg.unwrap_or_else(|| "export failed".to_string()),
				)),
				PollStep::Finished => {
					info!("export {job_id} ready");
					job.set(JobView::Ready(status));
				}
				PollStep::GiveUp => {
					warn!("export {job_id} still {:?} after {} polls", status.status, attempt + 1);
					job.set(JobView::Failed("export is taking too long, try again later".into()));
				}
				PollStep::Again => {
					job.set(JobView::Waiting(Some(status)));
					set_timeout(move || poll(api, job_id, job, attempt + 1), POLL_INTERVAL);
				}
			},
			Err(err) => job.set(JobView::Failed(err.to_string())),
		}
	});
}

/// Queues an export job and polls it until a download link is available.
#[component]
pub fn ExportPanel() -> impl IntoView {
	let api = expect_context::<ExportApi>();
	let kind = RwSignal::new(ExportKind::Papers.as_str().to_string());
	let format = RwSignal::new("csv".to_string());
	let year = RwSignal::new(String::new());
	let keyword = RwSignal::new(String::new());
	let job = RwSignal::new(JobView::Idle);

	let poll_api = api.clone();
	let start = move || {
		let request = export_request(
			&kind.get_untracked(),
			&format.get_untracked(),
			&year.get_untracked(),
			&keyword.get_untracked(),
		);
		let api = poll_api.clone();
		job.set(JobView::Waiting(None));
		spawn_local(async move {
			match api.create_export(&request).await {
				Ok(created) => poll(api, created.job_id, job, 0),
				Err(err) => job.set(JobView::Failed(err.to_string())),
			}
		});
	};

	view! {
		<form class="export-panel" on:submit=move |ev| {
			ev.prevent_default();
			start();
		}>
			<select on:change=move |ev| kind.set(event_target_value(&ev))>
				{ExportKind::ALL
					.iter()
					.map(|k| view! { <option value={k.as_str()}>{k.as_str()}</option> })
					.collect_view()}
			</select>
			<select on:change=move |ev| format.set(event_target_value(&ev))>
				<option value="csv">"CSV"</option>
				<option value="excel">"Excel"</option>
			</select>
			<input
				type="number"
				placeholder="Year"
				prop:value=move || year.get()
				on:input=move |ev| year.set(event_target_value(&ev))
			/>
			<input
				type="text"
				placeholder="Keyword"
				prop:value=move || keyword.get()
				on:input=move |ev| keyword.set(event_target_value(&ev))
			/>
			<button
				type="submit"
				disabled=move || matches!(job.get(), JobView::Waiting(_))
			>
				"Export"
			</button>
			{move || match job.get() {
				JobView::Idle => ().into_any(),
				JobView::Waiting(status) => {
					let progress = status
						.and_then(|s| s.progress)
						.map(|p| format!(" {:.0}%", p * 100.0))
						.unwrap_or_default();
					view! { <span class="loading">"Exporting…" {progress}</span> }.into_any()
				}
				JobView::Ready(status) => match api.download_link(&status) {
					Some(href) => view! { <a class="download" href=href>"Download"</a> }.into_any(),
					None => ().into_any(),
				},
				JobView::Failed(message) => view! { <span class="error">{message}</span> }.into_any(),
			}}
		</form>
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn blank_filters_are_left_out() {
		let request = export_request("authors", "excel", " ", "  ");
		assert_eq!(request.export_type, ExportKind::Authors);
		assert_eq!(request.format, ExportFormat::Excel);
		assert!(request.filters.is_empty());
	}

	#[test]
	fn year_and_keyword_become_filters() {
		let request = export_request("bogus", "pdf", "2019", " graph nets ");
		assert_eq!(request.export_type, ExportKind::Papers);
		assert_eq!(request.format, ExportFormat::Csv);
		assert_eq!(request.filters.get("year"), Some(&json!(2019)));
		assert_eq!(request.filters.get("keyword"), Some(&json!("graph nets")));
	}
}
