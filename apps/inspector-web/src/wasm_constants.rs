pub(crate) const LOADER_ID: &str = "user-inspector-loader";
pub(crate) const PANEL_ID: &str = "user-inspector-panel";
pub(crate) const SURFACE_Z_INDEX: &str = "999999";
pub(crate) const SURFACE_FONT: &str = "ui-monospace, SFMono-Regular, Menlo, monospace";
pub(crate) const LOADER_TEXT: &str = "⏳ Loading data...";
pub(crate) const CLOSE_GLYPH: &str = "✖";
pub(crate) const ACTION_SELECTOR: &str = "[data-action]";
pub(crate) const BUTTON_IDLE_BACKGROUND: &str = "#333";
pub(crate) const ACTIVATE_IDLE_BACKGROUND: &str = "#2d4a7a";
pub(crate) const CLIPBOARD_GLOBAL: &str = "clipboard";
pub(crate) const CLIPBOARD_WRITE_TEXT: &str = "writeText";
