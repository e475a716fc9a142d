use leptos::prelude::*;

use crate::components::editor::{Editor, ToastNotifier};
use crate::components::editor_panel::NodeEditorPanel;
use crate::components::mind_map::MindMapCanvas;
use crate::components::toasts::Toasts;
use crate::components::toolbar::Toolbar;
use crate::config::EditorConfig;
use crate::controller::{BrowserStorage, InteractionController};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = EditorConfig::load(&BrowserStorage);
	let toasts = RwSignal::new(Vec::new());
	let notifier = ToastNotifier::new(toasts, config.toast_millis);
	let mut controller = InteractionController::new(BrowserStorage, notifier, config);
	controller.start();
	let editor = Editor::new(controller);

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

			<div class="fullscreen-canvas">
				<MindMapCanvas editor=editor fullscreen=true />
				<Toolbar editor=editor />
				<NodeEditorPanel editor=editor />
				<Toasts toasts=toasts />
			</div>
		</ErrorBoundary>
	}
}
