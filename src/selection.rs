//! Selection bridge between the graph and the card lists
//!
//! A view presents cases in up to two independent lists: a compact
//! horizontal list for narrow layouts and a full vertical list otherwise.
//! Each mounted list registers a [`CardHandle`] per case id in the
//! [`CardRegistry`]; the bridge highlights and scrolls cards only through
//! those handles.
//!
//! Scrolling is two-phase. Activation commits the selection and queues a
//! [`ScrollRequest`]; the host fulfils it after a short settling delay. A
//! request issued before a later activation or a clear is stale and is
//! dropped when fulfilled.

use std::collections::{BTreeMap, HashMap};

/// Which card list a handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListKind {
    /// Horizontal list shown below the breakpoint
    Compact,
    /// Vertical list shown at or above the breakpoint
    Full,
}

impl ListKind {
    /// How a card in this list is aligned when scrolled into view
    pub fn scroll_align(self) -> ScrollAlign {
        match self {
            ListKind::Compact => ScrollAlign::InlineCenter,
            ListKind::Full => ScrollAlign::BlockCenter,
        }
    }
}

/// Scroll alignment for a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Centre horizontally, nearest vertically
    InlineCenter,
    /// Centre vertically
    BlockCenter,
}

/// A card rendered by a list view
pub trait CardHandle {
    /// Smoothly scroll the card into view; fire and forget
    fn scroll_into_view(&mut self, align: ScrollAlign);

    /// Apply or remove the highlighted visual state
    fn set_highlighted(&mut self, highlighted: bool);
}

/// Handle type for views without card lists
#[derive(Debug)]
pub enum NoCards {}

impl CardHandle for NoCards {
    fn scroll_into_view(&mut self, _align: ScrollAlign) {
        match *self {}
    }

    fn set_highlighted(&mut self, _highlighted: bool) {
        match *self {}
    }
}

/// Card handles keyed by list and case id
#[derive(Debug)]
pub struct CardRegistry<H> {
    lists: BTreeMap<ListKind, HashMap<String, H>>,
}

impl<H> Default for CardRegistry<H> {
    fn default() -> Self {
        Self {
            lists: BTreeMap::new(),
        }
    }
}

impl<H: CardHandle> CardRegistry<H> {
    /// Register a card, returning the handle it replaced
    pub fn register(&mut self, list: ListKind, id: impl Into<String>, handle: H) -> Option<H> {
        self.lists.entry(list).or_default().insert(id.into(), handle)
    }

    pub fn unregister(&mut self, list: ListKind, id: &str) -> Option<H> {
        self.lists.get_mut(&list)?.remove(id)
    }

    /// Drop every handle of an unmounted list
    pub fn unmount(&mut self, list: ListKind) {
        self.lists.remove(&list);
    }

    pub fn contains(&self, list: ListKind, id: &str) -> bool {
        self.lists.get(&list).is_some_and(|cards| cards.contains_key(id))
    }

    fn get_mut(&mut self, list: ListKind, id: &str) -> Option<&mut H> {
        self.lists.get_mut(&list)?.get_mut(id)
    }

    /// Set the highlight on the card for `id` in every list
    fn highlight(&mut self, id: &str, highlighted: bool) {
        for cards in self.lists.values_mut() {
            if let Some(handle) = cards.get_mut(id) {
                handle.set_highlighted(highlighted);
            }
        }
    }
}

/// A pending scroll-into-view for the selected case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub id: String,
    epoch: u64,
}

/// Result of fulfilling a scroll request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    Scrolled(ListKind),
    /// The selection changed since the request was issued
    Stale,
    /// No visible list has a card for the id
    Missing,
}

/// Result of an activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The reference case cannot be selected
    Ignored,
    Selected {
        previous: Option<String>,
        scroll: ScrollRequest,
    },
}

/// Single-selection state for one graph view
#[derive(Debug)]
pub struct SelectionBridge<H> {
    selected: Option<String>,
    reference: Option<String>,
    epoch: u64,
    registry: CardRegistry<H>,
    breakpoint: f32,
    layout_width: f32,
}

impl<H: CardHandle> SelectionBridge<H> {
    pub fn new(breakpoint: f32) -> Self {
        Self {
            selected: None,
            reference: None,
            epoch: 0,
            registry: CardRegistry::default(),
            breakpoint,
            layout_width: f32::INFINITY,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Width of the host layout, used to decide which list is visible
    pub fn set_layout_width(&mut self, width: f32) {
        self.layout_width = width;
    }

    /// The list considered visible for the current layout width
    pub fn visible_list(&self) -> ListKind {
        if self.layout_width < self.breakpoint {
            ListKind::Compact
        } else {
            ListKind::Full
        }
    }

    pub fn registry(&self) -> &CardRegistry<H> {
        &self.registry
    }

    /// Register a card; it is highlighted right away if already selected
    pub fn register(&mut self, list: ListKind, id: impl Into<String>, mut handle: H) {
        let id = id.into();
        if self.is_selected(&id) {
            handle.set_highlighted(true);
        }
        self.registry.register(list, id, handle);
    }

    pub fn unregister(&mut self, list: ListKind, id: &str) -> Option<H> {
        self.registry.unregister(list, id)
    }

    pub fn unmount(&mut self, list: ListKind) {
        self.registry.unmount(list);
    }

    /// Select a case and queue a scroll to its card
    pub fn activate(&mut self, id: &str) -> Activation {
        if self.reference.as_deref() == Some(id) {
            tracing::debug!(id, "ignoring activation of reference case");
            return Activation::Ignored;
        }

        let previous = self.selected.take();
        if let Some(prev) = previous.as_deref() {
            if prev != id {
                self.registry.highlight(prev, false);
            }
        }
        self.registry.highlight(id, true);
        self.selected = Some(id.to_string());
        self.epoch += 1;
        tracing::debug!(id, previous = ?previous, "selected case");

        Activation::Selected {
            previous,
            scroll: ScrollRequest {
                id: id.to_string(),
                epoch: self.epoch,
            },
        }
    }

    /// Clear the selection and invalidate pending scroll requests
    pub fn clear(&mut self) {
        if let Some(prev) = self.selected.take() {
            self.registry.highlight(&prev, false);
            tracing::debug!(id = %prev, "cleared selection");
        }
        self.epoch += 1;
    }

    /// Clear for a new node set with the given reference case
    pub fn reset(&mut self, reference: Option<String>) {
        self.clear();
        self.reference = reference;
    }

    /// Scroll the visible list to the requested card if still current
    pub fn fulfil(&mut self, request: &ScrollRequest) -> ScrollOutcome {
        if request.epoch != self.epoch || !self.is_selected(&request.id) {
            return ScrollOutcome::Stale;
        }

        let list = if self.visible_list() == ListKind::Compact
            && self.registry.contains(ListKind::Compact, &request.id)
        {
            ListKind::Compact
        } else if self.registry.contains(ListKind::Full, &request.id) {
            ListKind::Full
        } else {
            tracing::warn!(id = %request.id, "no card found to scroll into view");
            return ScrollOutcome::Missing;
        };

        if let Some(handle) = self.registry.get_mut(list, &request.id) {
            handle.scroll_into_view(list.scroll_align());
        }
        tracing::debug!(id = %request.id, ?list, "scrolled card into view");
        ScrollOutcome::Scrolled(list)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Card handle that records what happened to it
    #[derive(Debug, Clone)]
    pub(crate) struct RecordingCard {
        pub(crate) id: String,
        pub(crate) list: ListKind,
        pub(crate) log: Rc<RefCell<Vec<CardEvent>>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum CardEvent {
        Highlight(ListKind, String, bool),
        Scroll(ListKind, String, ScrollAlign),
    }

    impl CardHandle for RecordingCard {
        fn scroll_into_view(&mut self, align: ScrollAlign) {
            self.log
                .borrow_mut()
                .push(CardEvent::Scroll(self.list, self.id.clone(), align));
        }

        fn set_highlighted(&mut self, highlighted: bool) {
            self.log
                .borrow_mut()
                .push(CardEvent::Highlight(self.list, self.id.clone(), highlighted));
        }
    }

    pub(crate) fn mount(
        bridge: &mut SelectionBridge<RecordingCard>,
        list: ListKind,
        ids: &[&str],
        log: &Rc<RefCell<Vec<CardEvent>>>,
    ) {
        for id in ids {
            bridge.register(
                list,
                *id,
                RecordingCard {
                    id: id.to_string(),
                    list,
                    log: Rc::clone(log),
                },
            );
        }
    }

    fn bridge_with_both_lists() -> (SelectionBridge<RecordingCard>, Rc<RefCell<Vec<CardEvent>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bridge = SelectionBridge::new(768.0);
        bridge.reset(Some("REF".to_string()));
        mount(&mut bridge, ListKind::Compact, &["A", "B"], &log);
        mount(&mut bridge, ListKind::Full, &["A", "B"], &log);
        (bridge, log)
    }

    fn highlighted(log: &[CardEvent]) -> Vec<(ListKind, String)> {
        let mut state: BTreeMap<(ListKind, String), bool> = BTreeMap::new();
        for event in log {
            if let CardEvent::Highlight(list, id, on) = event {
                state.insert((*list, id.clone()), *on);
            }
        }
        state.into_iter().filter(|(_, on)| *on).map(|(k, _)| k).collect()
    }

    #[test]
    fn second_activation_moves_highlight() {
        let (mut bridge, log) = bridge_with_both_lists();

        bridge.activate("A");
        let activation = bridge.activate("B");

        assert!(matches!(
            activation,
            Activation::Selected { previous: Some(ref p), .. } if p == "A"
        ));
        assert_eq!(bridge.selected(), Some("B"));
        assert_eq!(
            highlighted(&log.borrow()),
            vec![
                (ListKind::Compact, "B".to_string()),
                (ListKind::Full, "B".to_string()),
            ]
        );
    }

    #[test]
    fn previous_highlight_cleared_before_new_one_applied() {
        let (mut bridge, log) = bridge_with_both_lists();
        bridge.activate("A");
        log.borrow_mut().clear();

        bridge.activate("B");

        let events = log.borrow();
        let first_on = events
            .iter()
            .position(|e| matches!(e, CardEvent::Highlight(_, _, true)))
            .unwrap();
        let last_off = events
            .iter()
            .rposition(|e| matches!(e, CardEvent::Highlight(_, _, false)))
            .unwrap();
        assert!(last_off < first_on, "double highlight in {events:?}");
    }

    #[test]
    fn reference_activation_is_ignored() {
        let (mut bridge, log) = bridge_with_both_lists();
        bridge.activate("A");
        log.borrow_mut().clear();

        assert_eq!(bridge.activate("REF"), Activation::Ignored);
        assert_eq!(bridge.selected(), Some("A"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn wide_layout_scrolls_full_list() {
        let (mut bridge, log) = bridge_with_both_lists();
        bridge.set_layout_width(1280.0);

        let Activation::Selected { scroll, .. } = bridge.activate("B") else {
            panic!("expected selection");
        };
        assert_eq!(bridge.fulfil(&scroll), ScrollOutcome::Scrolled(ListKind::Full));
        assert!(log.borrow().contains(&CardEvent::Scroll(
            ListKind::Full,
            "B".to_string(),
            ScrollAlign::BlockCenter
        )));
    }

    #[test]
    fn narrow_layout_scrolls_compact_list_only() {
        let (mut bridge, log) = bridge_with_both_lists();
        bridge.set_layout_width(390.0);

        let Activation::Selected { scroll, .. } = bridge.activate("A") else {
            panic!("expected selection");
        };
        assert_eq!(
            bridge.fulfil(&scroll),
            ScrollOutcome::Scrolled(ListKind::Compact)
        );
        let scrolls: Vec<_> = log
            .borrow()
            .iter()
            .filter(|e| matches!(e, CardEvent::Scroll(..)))
            .cloned()
            .collect();
        assert_eq!(
            scrolls,
            vec![CardEvent::Scroll(
                ListKind::Compact,
                "A".to_string(),
                ScrollAlign::InlineCenter
            )]
        );
    }

    #[test]
    fn narrow_layout_falls_back_to_full_list() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bridge = SelectionBridge::new(768.0);
        mount(&mut bridge, ListKind::Full, &["A"], &log);
        bridge.set_layout_width(390.0);

        let Activation::Selected { scroll, .. } = bridge.activate("A") else {
            panic!("expected selection");
        };
        assert_eq!(bridge.fulfil(&scroll), ScrollOutcome::Scrolled(ListKind::Full));
    }

    #[test]
    fn missing_card_still_commits_selection() {
        let (mut bridge, _log) = bridge_with_both_lists();

        let Activation::Selected { scroll, .. } = bridge.activate("filtered-out") else {
            panic!("expected selection");
        };
        assert_eq!(bridge.fulfil(&scroll), ScrollOutcome::Missing);
        assert_eq!(bridge.selected(), Some("filtered-out"));
    }

    #[test]
    fn requests_go_stale_after_newer_activation_or_clear() {
        let (mut bridge, log) = bridge_with_both_lists();

        let Activation::Selected { scroll: first, .. } = bridge.activate("A") else {
            panic!("expected selection");
        };
        let Activation::Selected { scroll: second, .. } = bridge.activate("B") else {
            panic!("expected selection");
        };
        assert_eq!(bridge.fulfil(&first), ScrollOutcome::Stale);

        bridge.clear();
        assert_eq!(bridge.fulfil(&second), ScrollOutcome::Stale);
        assert!(bridge.selected().is_none());
        assert!(highlighted(&log.borrow()).is_empty());
        assert!(!log.borrow().iter().any(|e| matches!(e, CardEvent::Scroll(..))));
    }

    #[test]
    fn late_registered_card_picks_up_highlight() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bridge = SelectionBridge::new(768.0);
        bridge.activate("A");

        mount(&mut bridge, ListKind::Full, &["A", "B"], &log);

        assert_eq!(
            highlighted(&log.borrow()),
            vec![(ListKind::Full, "A".to_string())]
        );
    }

    #[test]
    fn unmounted_list_is_not_scrolled() {
        let (mut bridge, _log) = bridge_with_both_lists();
        bridge.unmount(ListKind::Full);
        assert!(!bridge.registry().contains(ListKind::Full, "A"));

        let Activation::Selected { scroll, .. } = bridge.activate("A") else {
            panic!("expected selection");
        };
        assert_eq!(bridge.fulfil(&scroll), ScrollOutcome::Missing);
    }
}
