//! Owned DOM event listeners and the animation frame loop
//!
//! Both types detach from the browser when dropped, so a view that is
//! destroyed, or whose setup fails halfway, leaves no callbacks behind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Event, EventTarget, Window};

/// An event listener removed from its target on drop
pub struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }

    /// Like [`new`](Self::new) but allows `preventDefault` on scroll-like events
    pub fn non_passive(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.event,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}

struct LoopState {
    handle: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

/// A `requestAnimationFrame` loop that runs only while there is work
///
/// `step` is called once per frame and returns whether another frame is
/// needed. [`request`](Self::request) restarts an idle loop.
pub struct AnimationLoop {
    window: Window,
    state: Rc<RefCell<LoopState>>,
}

impl AnimationLoop {
    pub fn new(window: Window, mut step: impl FnMut() -> bool + 'static) -> Self {
        let state = Rc::new(RefCell::new(LoopState {
            handle: None,
            callback: None,
        }));

        let weak: Weak<RefCell<LoopState>> = Rc::downgrade(&state);
        let frame_window = window.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.borrow_mut().handle = None;
            if step() {
                schedule(&frame_window, &state);
            }
        });
        state.borrow_mut().callback = Some(callback);

        Self { window, state }
    }

    /// Make sure a frame is pending
    pub fn request(&self) {
        schedule(&self.window, &self.state);
    }
}

fn schedule(window: &Window, state: &Rc<RefCell<LoopState>>) {
    let mut state = state.borrow_mut();
    if state.handle.is_some() {
        return;
    }
    let Some(callback) = state.callback.as_ref() else {
        return;
    };
    if let Ok(handle) = window.request_animation_frame(callback.as_ref().unchecked_ref()) {
        state.handle = Some(handle);
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(handle) = state.handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        state.callback = None;
    }
}
