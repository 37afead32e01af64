//! Card list elements as selection targets

use casegraph::selection::{CardHandle, ListKind, ScrollAlign};
use web_sys::{Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

/// Class toggled on the card of the selected case
pub const HIGHLIGHT_CLASS: &str = "case-card--selected";

/// A card element rendered by the host page
pub struct DomCard {
    element: Element,
}

impl DomCard {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl CardHandle for DomCard {
    fn scroll_into_view(&mut self, align: ScrollAlign) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        match align {
            ScrollAlign::InlineCenter => {
                options.set_block(ScrollLogicalPosition::Nearest);
                options.set_inline(ScrollLogicalPosition::Center);
            }
            ScrollAlign::BlockCenter => options.set_block(ScrollLogicalPosition::Center),
        }
        self.element
            .scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        let _ = self
            .element
            .class_list()
            .toggle_with_force(HIGHLIGHT_CLASS, highlighted);
    }
}

/// Parse the list name used by the JavaScript API
pub fn parse_list(name: &str) -> Option<ListKind> {
    match name {
        "compact" | "mobile" => Some(ListKind::Compact),
        "full" | "desktop" => Some(ListKind::Full),
        _ => None,
    }
}
