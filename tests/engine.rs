use std::cell::RefCell;
use std::rc::Rc;

use casegraph::case::sample_cases;
use casegraph::interaction::PointerOutcome;
use casegraph::selection::{CardHandle, ListKind, ScrollAlign, ScrollOutcome};
use casegraph::{CaseRecord, GraphConfig, GraphView};

/// Shared record of what the lists were asked to do
#[derive(Default)]
struct Lists {
    highlighted: Vec<(ListKind, String)>,
    scrolled: Vec<(ListKind, String, ScrollAlign)>,
}

struct Card {
    id: String,
    list: ListKind,
    lists: Rc<RefCell<Lists>>,
}

impl CardHandle for Card {
    fn scroll_into_view(&mut self, align: ScrollAlign) {
        self.lists
            .borrow_mut()
            .scrolled
            .push((self.list, self.id.clone(), align));
    }

    fn set_highlighted(&mut self, highlighted: bool) {
        let mut lists = self.lists.borrow_mut();
        let key = (self.list, self.id.clone());
        lists.highlighted.retain(|k| k != &key);
        if highlighted {
            lists.highlighted.push(key);
        }
    }
}

fn mounted_view(cases: &[CaseRecord], lists: &Rc<RefCell<Lists>>) -> GraphView<Card> {
    let mut view = GraphView::new(GraphConfig::default()).unwrap();
    view.resize(800.0, 600.0);
    view.set_cases(cases);
    for list in [ListKind::Compact, ListKind::Full] {
        for case in cases {
            view.register_card(
                list,
                case.id.clone(),
                Card {
                    id: case.id.clone(),
                    list,
                    lists: Rc::clone(lists),
                },
            );
        }
    }
    view
}

fn screen_position(view: &GraphView<Card>, id: &str) -> (f32, f32) {
    let frame = view.frame().unwrap();
    let node = frame.nodes.iter().find(|n| n.id == id).unwrap();
    view.interaction()
        .viewport()
        .model_to_screen(node.x, node.y)
}

#[test]
fn sample_layout_settles_inside_canvas() {
    let lists = Rc::new(RefCell::new(Lists::default()));
    let mut view = mounted_view(&sample_cases(), &lists);

    let mut ticks = 0;
    while view.tick().is_some() {
        ticks += 1;
        assert!(ticks < 2000, "layout never settled");
    }
    assert!(!view.needs_frame());

    let sim = view.simulation().unwrap();
    for node in &sim.nodes {
        let r = node.collision_radius;
        assert!(node.x >= r && node.x <= 800.0 - r, "{} at x={}", node.id, node.x);
        assert!(node.y >= r && node.y <= 600.0 - r, "{} at y={}", node.id, node.y);
    }
}

#[test]
fn clicks_move_highlight_and_scroll_visible_list() {
    let lists = Rc::new(RefCell::new(Lists::default()));
    let cases = sample_cases();
    let mut view = mounted_view(&cases, &lists);
    let activated = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&activated);
    view.on_node_activate(move |id| sink.borrow_mut().push(id.to_string()));
    view.set_layout_width(1440.0);
    view.settle(1000);

    for id in ["2021-9012", "2023-8901"] {
        let (x, y) = screen_position(&view, id);
        view.pointer_down(x, y);
        assert!(matches!(view.pointer_up(), PointerOutcome::Activate(_)));
        let request = view.take_scroll_request().unwrap();
        assert_eq!(
            view.fulfil_scroll(&request),
            ScrollOutcome::Scrolled(ListKind::Full)
        );
    }

    assert_eq!(*activated.borrow(), ["2021-9012", "2023-8901"]);
    assert_eq!(view.selected(), Some("2023-8901"));
    let lists = lists.borrow();
    assert_eq!(
        lists.highlighted,
        [
            (ListKind::Compact, "2023-8901".to_string()),
            (ListKind::Full, "2023-8901".to_string()),
        ]
    );
    assert!(
        lists
            .scrolled
            .iter()
            .all(|(list, _, align)| *list == ListKind::Full && *align == ScrollAlign::BlockCenter)
    );
}

#[test]
fn reference_node_is_draggable_but_not_selectable() {
    let lists = Rc::new(RefCell::new(Lists::default()));
    let mut view = mounted_view(&sample_cases(), &lists);
    view.settle(1000);
    let reference = view.graph().reference().unwrap().id.clone();

    let (x, y) = screen_position(&view, &reference);
    view.pointer_down(x, y);
    assert_eq!(view.pointer_up(), PointerOutcome::None);
    assert_eq!(view.selected(), None);
    assert!(view.take_scroll_request().is_none());

    view.pointer_down(x, y);
    assert!(matches!(
        view.pointer_move(x + 30.0, y + 30.0),
        PointerOutcome::DragMoved(_)
    ));
    assert!(matches!(view.pointer_up(), PointerOutcome::DragEnded(_)));
    assert!(lists.borrow().highlighted.is_empty());
}

#[test]
fn dragging_off_canvas_pins_inside_inset() {
    let lists = Rc::new(RefCell::new(Lists::default()));
    let mut view = mounted_view(&sample_cases(), &lists);
    view.settle(1000);

    let (x, y) = screen_position(&view, "2022-4567");
    view.pointer_down(x, y);
    view.pointer_move(5000.0, -5000.0);

    let sim = view.simulation().unwrap();
    let padding = view.interaction().drag_padding(sim);
    let index = sim.index_of("2022-4567").unwrap();
    assert_eq!(sim.nodes[index].fx, Some(800.0 - padding));
    assert_eq!(sim.nodes[index].fy, Some(padding));

    // A few ticks later the node sits on its pin
    for _ in 0..5 {
        view.tick();
    }
    let sim = view.simulation().unwrap();
    assert_eq!(sim.nodes[index].x, 800.0 - padding);
    view.pointer_leave();
}

#[test]
fn searching_replaces_node_set_and_clears_selection() {
    let lists = Rc::new(RefCell::new(Lists::default()));
    let corpus = sample_cases();
    let mut view = mounted_view(&corpus, &lists);
    view.activate("2021-7777");
    let stale = view.take_scroll_request().unwrap();

    view.search(&corpus, "section");

    assert_eq!(view.selected(), None);
    assert!(lists.borrow().highlighted.is_empty());
    assert_eq!(view.fulfil_scroll(&stale), ScrollOutcome::Stale);
    assert!(view.graph().len() < corpus.len());
    assert!(view.graph().nodes.iter().all(|n| {
        corpus
            .iter()
            .find(|c| c.id == n.id)
            .is_some_and(|c| c.matches("section"))
    }));
}
