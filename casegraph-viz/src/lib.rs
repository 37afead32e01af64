//! Browser bindings for the casegraph layout engine
//!
//! [`CaseGraphCanvas`] mounts a [`GraphView`] on an HTML canvas: it wires
//! pointer, wheel and resize events, drives the animation frame loop, paints
//! frames with the 2D canvas renderer and keeps the page's card lists in sync
//! with the graph selection.

mod canvas2d;
mod cards;
mod listeners;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use casegraph::case::{CaseRecord, filter_cases, parse_cases};
use casegraph::interaction::PointerOutcome;
use casegraph::{GraphConfig, GraphView};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use crate::canvas2d::Canvas2DRenderer;
use crate::cards::{DomCard, parse_list};
use crate::listeners::{AnimationLoop, EventListener};

/// Initialize WASM panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// State reachable from event handlers
struct Mounted {
    view: GraphView<DomCard>,
    renderer: Canvas2DRenderer,
    corpus: Vec<CaseRecord>,
}

struct Shared {
    window: Window,
    mounted: RefCell<Mounted>,
    /// Ids clicked during the current event, reported once it is handled
    activations: Rc<RefCell<Vec<String>>>,
    on_activate: RefCell<Option<js_sys::Function>>,
    animation: RefCell<Option<AnimationLoop>>,
}

impl Shared {
    /// Repaint, restart the frame loop if needed and flush side effects
    fn after_change(self: &Rc<Self>) {
        let needs_frame = {
            let mounted = self.mounted.borrow();
            match mounted.view.frame() {
                Some(frame) => mounted.renderer.render(&frame),
                None => mounted.renderer.clear(),
            }
            mounted.view.needs_frame()
        };
        if needs_frame {
            if let Some(animation) = self.animation.borrow().as_ref() {
                animation.request();
            }
        }
        self.flush_activations();
        self.schedule_scroll();
    }

    fn flush_activations(&self) {
        let ids: Vec<String> = self.activations.borrow_mut().drain(..).collect();
        let Some(callback) = self.on_activate.borrow().clone() else {
            return;
        };
        for id in ids {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&id)) {
                web_sys::console::error_2(&"onNodeActivate callback failed".into(), &err);
            }
        }
    }

    /// Fulfil the pending scroll request after the settling delay
    fn schedule_scroll(self: &Rc<Self>) {
        let (request, delay) = {
            let mut mounted = self.mounted.borrow_mut();
            let Some(request) = mounted.view.take_scroll_request() else {
                return;
            };
            (request, mounted.view.config().selection.scroll_delay_ms)
        };
        let weak: Weak<Shared> = Rc::downgrade(self);
        let callback = Closure::once_into_js(move || {
            if let Some(shared) = weak.upgrade() {
                shared.mounted.borrow_mut().view.fulfil_scroll(&request);
            }
        });
        let _ = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay as i32,
            );
    }

    /// Re-measure the canvas and the page layout
    fn measure(&self) {
        let layout_width = self
            .window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .unwrap_or(f64::INFINITY) as f32;
        let mut mounted = self.mounted.borrow_mut();
        let (width, height) = mounted.renderer.measure();
        mounted.renderer.resize(width, height);
        mounted.view.set_layout_width(layout_width);
        mounted.view.resize(width, height);
    }

    fn pointer(self: &Rc<Self>, handle: impl FnOnce(&mut GraphView<DomCard>) -> PointerOutcome) {
        let outcome = {
            let mut mounted = self.mounted.borrow_mut();
            let outcome = handle(&mut mounted.view);
            if let PointerOutcome::HoverChanged(hovered) = outcome {
                mounted.renderer.set_pointer_cursor(hovered.is_some());
            }
            outcome
        };
        if outcome != PointerOutcome::None {
            self.after_change();
        }
    }
}

fn mouse_position(event: &Event) -> Option<(f32, f32)> {
    let event = event.dyn_ref::<MouseEvent>()?;
    Some((event.offset_x() as f32, event.offset_y() as f32))
}

/// An interactive case graph mounted on a canvas element
#[wasm_bindgen]
pub struct CaseGraphCanvas {
    shared: Rc<Shared>,
    listeners: Vec<EventListener>,
}

#[wasm_bindgen]
impl CaseGraphCanvas {
    /// Mount on `canvas` with a JSON array of case records
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, cases_json: &str) -> Result<CaseGraphCanvas, JsValue> {
        Self::mount(canvas, cases_json, GraphConfig::default())
    }

    /// Mount with a YAML configuration document
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        canvas: HtmlCanvasElement,
        cases_json: &str,
        config_yaml: &str,
    ) -> Result<CaseGraphCanvas, JsValue> {
        let config = GraphConfig::from_yaml_str(config_yaml).map_err(js_error)?;
        Self::mount(canvas, cases_json, config)
    }

    /// Replace the case corpus; clears the selection and restarts the layout
    #[wasm_bindgen(js_name = setCases)]
    pub fn set_cases(&self, cases_json: &str) -> Result<(), JsValue> {
        let corpus = parse_cases(cases_json).map_err(js_error)?;
        {
            let mut mounted = self.shared.mounted.borrow_mut();
            mounted.view.set_cases(&corpus);
            mounted.corpus = corpus;
        }
        self.shared.after_change();
        Ok(())
    }

    /// Show only cases matching `query`; an empty query shows all
    pub fn search(&self, query: &str) {
        {
            let mut mounted = self.shared.mounted.borrow_mut();
            let filtered = filter_cases(&mounted.corpus, query);
            mounted.view.set_cases(&filtered);
        }
        self.shared.after_change();
    }

    /// Re-measure after the host changed the canvas size
    pub fn resize(&self) {
        self.shared.measure();
        self.shared.after_change();
    }

    /// Register a card element of the `compact` or `full` list
    #[wasm_bindgen(js_name = registerCard)]
    pub fn register_card(&self, list: &str, id: &str, element: Element) -> Result<(), JsValue> {
        let list = parse_list(list).ok_or_else(|| js_error(format!("unknown list '{list}'")))?;
        self.shared
            .mounted
            .borrow_mut()
            .view
            .register_card(list, id, DomCard::new(element));
        Ok(())
    }

    #[wasm_bindgen(js_name = unregisterCard)]
    pub fn unregister_card(&self, list: &str, id: &str) {
        if let Some(list) = parse_list(list) {
            self.shared
                .mounted
                .borrow_mut()
                .view
                .unregister_card(list, id);
        }
    }

    /// Forget every card of a list that was unmounted
    #[wasm_bindgen(js_name = unregisterList)]
    pub fn unregister_list(&self, list: &str) {
        if let Some(list) = parse_list(list) {
            self.shared.mounted.borrow_mut().view.unmount_list(list);
        }
    }

    /// Set the callback invoked with a case id when its node is clicked
    #[wasm_bindgen(js_name = onNodeActivate)]
    pub fn on_node_activate(&self, callback: js_sys::Function) {
        *self.shared.on_activate.borrow_mut() = Some(callback);
    }

    /// Select a case, for example after a card click
    pub fn activate(&self, id: &str) -> bool {
        let selected = self.shared.mounted.borrow_mut().view.select_from_list(id);
        self.shared.after_change();
        selected
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&self) {
        self.shared.mounted.borrow_mut().view.clear_selection();
        self.shared.after_change();
    }

    pub fn selected(&self) -> Option<String> {
        self.shared
            .mounted
            .borrow()
            .view
            .selected()
            .map(str::to_string)
    }

    /// Summary panel numbers as JSON
    pub fn stats(&self) -> Result<String, JsValue> {
        let stats = self.shared.mounted.borrow().view.stats();
        serde_json::to_string(&stats).map_err(js_error)
    }

    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&self) {
        self.shared.mounted.borrow_mut().view.reset_view();
        self.shared.after_change();
    }

    #[wasm_bindgen(js_name = fitView)]
    pub fn fit_view(&self) {
        self.shared.mounted.borrow_mut().view.fit_view();
        self.shared.after_change();
    }

    /// Stop the layout and detach every listener
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.shared.animation.borrow_mut().take();
        self.shared.on_activate.borrow_mut().take();
        self.shared.mounted.borrow_mut().view.close();
    }
}

impl CaseGraphCanvas {
    fn mount(
        canvas: HtmlCanvasElement,
        cases_json: &str,
        config: GraphConfig,
    ) -> Result<CaseGraphCanvas, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let corpus = parse_cases(cases_json).map_err(js_error)?;
        let renderer = Canvas2DRenderer::new(canvas.clone()).map_err(js_error)?;

        let activations = Rc::new(RefCell::new(Vec::new()));
        let mut view = GraphView::new(config).map_err(js_error)?;
        let sink = Rc::clone(&activations);
        view.on_node_activate(move |id| sink.borrow_mut().push(id.to_string()));
        view.set_cases(&corpus);

        let shared = Rc::new(Shared {
            window: window.clone(),
            mounted: RefCell::new(Mounted {
                view,
                renderer,
                corpus,
            }),
            activations,
            on_activate: RefCell::new(None),
            animation: RefCell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        let animation = AnimationLoop::new(window.clone(), move || {
            let Some(shared) = weak.upgrade() else {
                return false;
            };
            let mut mounted = shared.mounted.borrow_mut();
            if mounted.view.is_closed() {
                return false;
            }
            if let Some(frame) = mounted.view.tick() {
                // Frames from a replaced node set are never painted
                if frame.generation == mounted.view.generation() {
                    mounted.renderer.render(&frame);
                }
            }
            mounted.view.needs_frame()
        });
        *shared.animation.borrow_mut() = Some(animation);

        // Listeners registered so far are detached if a later one fails
        let mut listeners = Vec::new();
        let target: &web_sys::EventTarget = canvas.as_ref();

        let s = Rc::clone(&shared);
        listeners.push(EventListener::new(target, "mousedown", move |event| {
            if let Some((x, y)) = mouse_position(&event) {
                s.pointer(|view| view.pointer_down(x, y));
            }
        })?);

        let s = Rc::clone(&shared);
        listeners.push(EventListener::new(target, "mousemove", move |event| {
            if let Some((x, y)) = mouse_position(&event) {
                s.pointer(|view| view.pointer_move(x, y));
            }
        })?);

        let s = Rc::clone(&shared);
        listeners.push(EventListener::new(target, "mouseup", move |_| {
            s.pointer(GraphView::pointer_up);
        })?);

        let s = Rc::clone(&shared);
        listeners.push(EventListener::new(target, "mouseleave", move |_| {
            s.pointer(GraphView::pointer_leave);
        })?);

        let s = Rc::clone(&shared);
        listeners.push(EventListener::non_passive(target, "wheel", move |event| {
            let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            event.prevent_default();
            let (dy, x, y) = (
                wheel.delta_y() as f32,
                wheel.offset_x() as f32,
                wheel.offset_y() as f32,
            );
            s.pointer(|view| view.wheel(dy, x, y));
        })?);

        let s = Rc::clone(&shared);
        listeners.push(EventListener::new(window.as_ref(), "resize", move |_| {
            s.measure();
            s.after_change();
        })?);

        shared.measure();
        shared.after_change();

        Ok(CaseGraphCanvas { shared, listeners })
    }
}

impl Drop for CaseGraphCanvas {
    fn drop(&mut self) {
        self.destroy();
    }
}
