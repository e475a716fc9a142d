use leptos::prelude::*;

use super::editor::Editor;
use crate::graph::NodeKind;

fn button_label(kind: NodeKind) -> &'static str {
	match kind {
		NodeKind::Chapter => "Add Chapter",
		NodeKind::MainTopic => "Add Main Topic",
		NodeKind::SubTopic => "Add Sub Topic",
	}
}

#[component]
pub fn Toolbar(editor: Editor) -> impl IntoView {
	let add_buttons = NodeKind::ALL
		.into_iter()
		.map(|kind| {
			view! {
				<button
					class="secondary"
					on:click=move |_| {
						editor.update(|c| c.add_node(kind));
					}
				>
					{button_label(kind)}
				</button>
			}
		})
		.collect_view();

	view! {
		<div
			class="toolbar"
			style="position: fixed; top: 16px; left: 16px; display: flex; flex-direction: column; \
			       gap: 8px; padding: 8px; border-radius: 8px; background: rgba(255,255,255,0.6); \
			       border: 1px solid #e5e7eb;"
		>
			{add_buttons}
			<button
				class="outline"
				on:click=move |_| {
					editor.update(|c| {
						let _ = c.save();
					});
				}
			>
				"Save Flow"
			</button>
		</div>
	}
}
