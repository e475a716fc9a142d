pub mod editor;
pub mod editor_panel;
pub mod mind_map;
pub mod toasts;
pub mod toolbar;
