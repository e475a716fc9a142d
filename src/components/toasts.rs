use leptos::prelude::*;

use super::editor::Toast;
use crate::controller::Level;

#[component]
pub fn Toasts(toasts: RwSignal<Vec<Toast>>) -> impl IntoView {
	view! {
		<div
			class="toasts"
			style="position: fixed; bottom: 16px; right: 16px; display: flex; flex-direction: column; gap: 8px;"
		>
			<For
				each=move || toasts.get()
				key=|toast| toast.id
				children=move |toast: Toast| {
					let color = match toast.notification.level {
						Level::Success => "#15803d",
						Level::Error => "#b91c1c",
					};
					view! {
						<div
							class="toast"
							style=format!(
								"padding: 10px 14px; border-radius: 8px; background: white; \
								 border-left: 4px solid {color}; box-shadow: 0 2px 8px rgba(0,0,0,0.12);"
							)
						>
							{toast.notification.message}
						</div>
					}
				}
			/>
		</div>
	}
}
