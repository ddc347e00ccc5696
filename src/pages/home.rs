use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::architecture::{ArchitectureConfig, ArchitectureGraph, NodeDetails, Snapshot, SourceFile};
use crate::components::force_graph::ForceGraphCanvas;

/// A small React-style project used as the demo batch.
fn sample_project() -> Vec<SourceFile> {
	let mut files = vec![
		SourceFile::inline(
			"src/pages/Dashboard.tsx",
			"import { Card } from '@/components/Card';\nimport { useAuth } from '../hooks/useAuth';\nimport { fetchStats } from '../services/statsService';",
		),
		SourceFile::inline(
			"src/pages/Login.tsx",
			"import Button from '../components/Button';\nimport { useAuth } from '@/hooks/useAuth';",
		),
		SourceFile::inline(
			"src/pages/Settings.tsx",
			"import { Card } from '../components/Card';\nimport type { User } from '../types/user';",
		),
		SourceFile::inline(
			"src/services/statsService.ts",
			"import { http } from './apiClient';\nimport type { Stats } from '@/types/stats';",
		),
		SourceFile::inline("src/services/apiClient.ts", "import { withRetry } from '../lib/retryHelper';"),
		SourceFile::inline("src/hooks/useAuth.ts", "import { http } from '@/services/apiClient';"),
		SourceFile::inline("src/lib/retryHelper.ts", ""),
		SourceFile::inline("src/types/user.ts", ""),
		SourceFile::inline("src/types/stats.ts", ""),
		SourceFile::inline("src/components/Card.tsx", "import './card.css';"),
		SourceFile::inline("src/components/Button.tsx", ""),
		SourceFile::inline("src/components/card.css", ""),
		SourceFile::inline("src/components/Button.test.tsx", "import Button from './Button';"),
		SourceFile::inline("package.json", "{}"),
		SourceFile::inline("tsconfig.json", "{}"),
		SourceFile::inline("README.md", "# demo"),
	];

	// Enough widgets to overflow the individual component allowance.
	for i in 0..10 {
		files.push(SourceFile::inline(
			format!("src/components/widgets/Widget{i}.tsx"),
			"import Button from '../Button';",
		));
	}
	files
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = ArchitectureConfig::default();
	let graph = RwSignal::new(ArchitectureGraph::default());
	let selected = RwSignal::new(None::<NodeDetails>);
	let export_tick = RwSignal::new(0u32);
	let download_href = RwSignal::new(None::<String>);

	let builder = config.builder();
	spawn_local(async move {
		let files = sample_project();
		let built = builder.build(&files).await;
		log::info!(
			"sample project: {} files, {} nodes, {} edges",
			built.stats.total_files,
			built.nodes.len(),
			built.edges.len()
		);
		graph.set(built);
	});

	let on_select = Callback::new(move |details: Option<NodeDetails>| selected.set(details));
	let on_export = Callback::new(move |snapshot: Snapshot| match snapshot.to_json() {
		Ok(json) => {
			let encoded = String::from(js_sys::encode_uri_component(&json));
			download_href.set(Some(format!("data:application/json;charset=utf-8,{encoded}")));
		}
		Err(err) => log::error!("{err}"),
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas
					data=graph
					config=config
					fullscreen=true
					on_select=on_select
					export_requests=export_tick
					on_export=on_export
				/>
				<div class="graph-overlay">
					<h1>"Codebase Atlas"</h1>
					<p class="subtitle">"Drag nodes to reposition. Click a node for details."</p>
					<button on:click=move |_| export_tick.update(|n| *n += 1)>"Export snapshot"</button>
					{move || {
						download_href
							.get()
							.map(|href| {
								view! {
									<a href=href download="architecture.json">
										"Download JSON"
									</a>
								}
							})
					}}
				</div>
				<aside class="graph-details">
					{move || match selected.get() {
						Some(details) => {
							view! {
								<h2>{details.name.clone()}</h2>
								<p>{format!("{} · {} connections", details.category, details.connections)}</p>
								<p>{format!("{} file(s)", details.member_count)}</p>
								<ul>
									{details
										.member_paths
										.into_iter()
										.map(|path| view! { <li>{path}</li> })
										.collect_view()}
								</ul>
							}
								.into_any()
						}
						None => view! { <p>"No node selected"</p> }.into_any(),
					}}
				</aside>
			</div>
		</ErrorBoundary>
	}
}
