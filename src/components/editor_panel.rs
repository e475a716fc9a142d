use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{FocusEvent, HtmlDocument, KeyboardEvent, MouseEvent};

use super::editor::Editor;
use crate::graph::NodeId;

/// Inline editor for the node whose edit session is open.
#[component]
pub fn NodeEditorPanel(editor: Editor) -> impl IntoView {
	let editing = Memo::new(move |_| {
		editor
			.read(|c| c.session().map(|session| session.node.clone()))
			.flatten()
	});

	move || editing.get().map(|id| view! { <EditCard editor=editor id=id /> })
}

#[component]
fn EditCard(editor: Editor, id: NodeId) -> impl IntoView {
	let panel_ref = NodeRef::<leptos::html::Div>::new();
	let title_ref = NodeRef::<leptos::html::Input>::new();
	let body_ref = NodeRef::<leptos::html::Div>::new();

	let Some((kind, draft)) = editor
		.peek(|c| {
			let session = c.session()?;
			let node = c.store().node(&session.node)?;
			Some((node.kind, session.draft.clone()))
		})
		.flatten()
	else {
		return ().into_any();
	};

	Effect::new(move |_| {
		if let Some(input) = title_ref.get() {
			let _ = input.focus();
		}
	});

	let sync_body = move || {
		if let Some(body) = body_ref.get_untracked() {
			let markup = exported_body(&body.inner_html());
			editor.update_quiet(|c| c.edit_body(markup));
		}
	};
	let commit = move || {
		sync_body();
		editor.update(|c| {
			if let Err(err) = c.commit_edit() {
				log::debug!("edit not committed: {err}");
			}
		});
	};
	let cancel = move || {
		editor.update(|c| c.cancel_edit());
	};

	// blur of the whole card, not of one field inside it
	let on_focusout = move |ev: FocusEvent| {
		let stays_inside = match (ev.related_target(), panel_ref.get()) {
			(Some(next), Some(panel)) => next
				.dyn_ref::<web_sys::Node>()
				.is_some_and(|next| panel.contains(Some(next))),
			_ => false,
		};
		if !stays_inside {
			commit();
		}
	};

	let on_title_key = move |ev: KeyboardEvent| match ev.key().as_str() {
		"Enter" => {
			ev.prevent_default();
			commit();
		}
		"Escape" => cancel(),
		_ => {}
	};
	let on_body_key = move |ev: KeyboardEvent| {
		if ev.key() == "Escape" {
			cancel();
		}
	};

	let on_delete = move |_: MouseEvent| {
		let id = id.clone();
		editor.update(move |c| c.delete_node(&id));
	};

	view! {
		<div
			node_ref=panel_ref
			class="node-editor"
			on:focusout=on_focusout
			style="position: fixed; top: 16px; right: 16px; width: 360px; padding: 20px; \
			       display: flex; flex-direction: column; gap: 12px; background: rgba(255,255,255,0.95); \
			       border: 2px solid #e5e7eb; border-radius: 12px; box-shadow: 0 4px 16px rgba(0,0,0,0.08);"
		>
			<div style="display: flex; align-items: center; justify-content: space-between;">
				<span class="badge" style="text-transform: capitalize; font-size: 12px;">
					{kind.display_name()}
				</span>
				<button
					class="delete"
					title="Delete node"
					on:mousedown=|ev: MouseEvent| ev.prevent_default()
					on:click=on_delete
				>
					"Delete"
				</button>
			</div>
			<input
				node_ref=title_ref
				type="text"
				placeholder="Enter note title..."
				prop:value=draft.title
				on:input=move |ev| {
					editor.update_quiet(|c| c.edit_title(event_target_value(&ev)));
				}
				on:keydown=on_title_key
				style="font-size: 18px; font-weight: 500;"
			/>
			<div style="display: flex; gap: 4px;">
				{FORMATS
					.iter()
					.map(|&(label, command, hint)| {
						view! {
							<button
								class="format"
								title=hint
								on:mousedown=move |ev: MouseEvent| {
									ev.prevent_default();
									apply_format(command);
									sync_body();
								}
								style="min-width: 32px; padding: 2px 6px;"
							>
								{label}
							</button>
						}
					})
					.collect_view()}
			</div>
			<div
				node_ref=body_ref
				class="node-body"
				contenteditable="true"
				inner_html=draft.body
				on:input=move |_| sync_body()
				on:keydown=on_body_key
				style="min-height: 120px; max-height: 320px; overflow-y: auto; padding: 10px 12px; \
				       border: 1px solid #e5e7eb; border-radius: 8px; font-size: 14px; outline: none;"
			></div>
		</div>
	}
	.into_any()
}

/// Toolbar entries: label, `execCommand` name, tooltip.
const FORMATS: [(&str, &str, &str); 5] = [
	("B", "bold", "Bold"),
	("I", "italic", "Italic"),
	("•", "insertUnorderedList", "Bullet list"),
	("1.", "insertOrderedList", "Numbered list"),
	("¶", "formatBlock", "Paragraph"),
];

/// Runs a formatting command on the current selection of the focused body.
fn apply_format(command: &str) {
	let Some(document) = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.dyn_into::<HtmlDocument>().ok())
	else {
		return;
	};
	let value = if command == "formatBlock" { "p" } else { "" };
	if let Err(err) = document.exec_command_with_show_ui_and_value(command, false, value) {
		log::warn!("{command} failed: {err:?}");
	}
}

/// Markup to store for the body. An editor emptied by the user still holds
/// a stray `<br>` or empty block; that is saved as no body at all.
fn exported_body(markup: &str) -> String {
	let mut in_tag = false;
	let has_text = markup.replace("&nbsp;", " ").chars().any(|c| match c {
		'<' => {
			in_tag = true;
			false
		}
		'>' => {
			in_tag = false;
			false
		}
		c => !in_tag && !c.is_whitespace(),
	});
	if has_text || markup.contains("<li") {
		markup.trim().to_owned()
	} else {
		String::new()
	}
}
