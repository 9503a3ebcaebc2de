//! Navigation widget: an ordered list of in-page anchor links.

use crate::markup::Markup;
use crate::settings::RenderOptions;

/// Class on the `<div>` wrapping the navigation list.
pub const NAV_WRAPPER_CLASS: &str = "table-master";

/// Anchor content when labels are hidden. A literal non-breaking space keeps
/// the anchor's box from collapsing, so icon-only navigation dots still size.
pub const HIDDEN_LABEL_PLACEHOLDER: &str = "&nbsp;";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavEntry {
    pub label: String,
    /// Element id the link jumps to, without the leading `#`.
    pub anchor_target: String,
}

impl NavEntry {
    pub fn new(label: impl Into<String>, anchor_target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            anchor_target: anchor_target.into(),
        }
    }

    pub fn href(&self) -> String {
        format!("#{}", self.anchor_target)
    }
}

/// Entries in display order plus the label visibility flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavList {
    pub entries: Vec<NavEntry>,
    pub show_labels: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NavListRenderer {
    options: RenderOptions,
}

impl NavListRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// One `<li><a href="#target">` per entry, in input order.
    pub fn render(&self, list: &NavList) -> String {
        let mut m = Markup::new(self.options.text_mode);
        m.open_with("div", "class", NAV_WRAPPER_CLASS).open("ul");
        for entry in &list.entries {
            m.open("li").open_with("a", "href", &entry.href());
            if list.show_labels {
                m.text(&entry.label);
            } else {
                m.raw(HIDDEN_LABEL_PLACEHOLDER);
            }
            m.close("a").close("li");
        }
        m.close("ul").close("div");

        log::trace!(
            "rendered navigation with {} entries (labels {})",
            list.entries.len(),
            if list.show_labels { "shown" } else { "hidden" }
        );
        m.into_string()
    }
}
