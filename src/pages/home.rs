use leptos::prelude::*;

use crate::components::diagram::{DiagramCanvas, DiagramData, DiagramNode, EdgeKey};

/// The default patch: two sources through a reverb into the main bus.
/// `guitar` skips the reverb column through an invisible junction.
fn default_chain() -> DiagramData {
	let nodes = vec![
		DiagramNode::new("inputs", "Inputs", 1, 0),
		DiagramNode::new("guitar", "Guitar", 0, 1),
		DiagramNode::new("mike", "Mike", 2, 1),
		DiagramNode::new("guitar_thru", "", 0, 2).invisible(),
		DiagramNode::new("reverb", "Reverb", 2, 2),
		DiagramNode::new("main", "Main", 1, 3),
		DiagramNode::new("outputs", "Outputs", 1, 4),
	];
	let edges = [
		("inputs", "guitar"),
		("inputs", "mike"),
		("guitar", "guitar_thru"),
		("guitar_thru", "main"),
		("mike", "reverb"),
		("reverb", "main"),
		("main", "outputs"),
	]
	.into_iter()
	.map(|(from, to)| EdgeKey::new(from, to))
	.collect();

	DiagramData {
		rows: 3,
		cols: 5,
		nodes,
		edges,
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let chain = Signal::derive(default_chain);

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

			<div class="fullscreen-diagram">
				<DiagramCanvas data=chain fullscreen=true />
				<div class="diagram-overlay">
					<h1>"Signal Chain"</h1>
					<p class="subtitle">"Arrow keys move focus along the chain. Escape clears it."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
