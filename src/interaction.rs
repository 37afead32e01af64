//! Pointer gestures: drag, click, pan, zoom and hover
//!
//! Pressing a node pins it where it stands and reheats the simulation so its
//! neighbours react; moving the pointer carries the pin along, keeping the
//! offset between the grab point and the node centre. Releasing it without
//! travelling further than the click tolerance counts as a click and yields
//! [`PointerOutcome::Activate`]; any real drag never activates. Pressing the
//! background pans the viewport.

use crate::config::ViewportConfig;
use crate::simulation::{Simulation, clamp_axis};
use crate::viewport::Viewport;

/// What a pointer event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Nothing changed
    None,
    /// A node was clicked
    Activate(usize),
    DragStarted(usize),
    DragMoved(usize),
    /// A drag finished without activating
    DragEnded(usize),
    Panned,
    Zoomed,
    /// The hovered node changed
    HoverChanged(Option<usize>),
}

/// In-flight pointer gesture
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    /// A node is pressed and pinned
    Node {
        index: usize,
        start: (f32, f32),
        /// Node centre minus the pointer, in model space
        offset: (f32, f32),
        moved: bool,
    },
    /// The background is pressed
    Pan { last: (f32, f32) },
}

/// Owns the viewport and translates pointer events into state changes
#[derive(Debug, Clone)]
pub struct InteractionController {
    viewport: Viewport,
    gesture: Gesture,
    hovered: Option<usize>,
    config: ViewportConfig,
    drag_alpha_target: f32,
}

impl InteractionController {
    pub fn new(config: ViewportConfig, drag_alpha_target: f32) -> Self {
        Self {
            viewport: Viewport::new(&config),
            gesture: Gesture::Idle,
            hovered: None,
            config,
            drag_alpha_target,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Index of the node currently held by a drag
    pub fn dragged(&self) -> Option<usize> {
        match self.gesture {
            Gesture::Node { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Drop any gesture and hover state tied to the current node set
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
        self.hovered = None;
    }

    /// Inset from the canvas edges that drag pins are clamped into
    pub fn drag_padding(&self, sim: &Simulation) -> f32 {
        sim.max_radius() + self.config.drag_padding
    }

    /// Clamp a model-space point into the drag inset region
    pub fn clamp_to_inset(&self, sim: &Simulation, x: f32, y: f32) -> (f32, f32) {
        let padding = self.drag_padding(sim);
        let size = sim.size();
        (
            clamp_axis(x, padding, size.width),
            clamp_axis(y, padding, size.height),
        )
    }

    pub fn pointer_down(&mut self, sim: &mut Simulation, sx: f32, sy: f32) -> PointerOutcome {
        let (mx, my) = self.viewport.screen_to_model(sx, sy);
        match sim.node_at(mx, my) {
            Some(index) => {
                let (x, y) = (sim.nodes[index].x, sim.nodes[index].y);
                let (px, py) = self.clamp_to_inset(sim, x, y);
                sim.pin(index, px, py);
                sim.set_alpha_target(self.drag_alpha_target);
                self.gesture = Gesture::Node {
                    index,
                    start: (sx, sy),
                    offset: (x - mx, y - my),
                    moved: false,
                };
                tracing::trace!(node = %sim.nodes[index].id, "drag start");
                PointerOutcome::DragStarted(index)
            }
            None => {
                self.gesture = Gesture::Pan { last: (sx, sy) };
                PointerOutcome::None
            }
        }
    }

    pub fn pointer_move(&mut self, sim: &mut Simulation, sx: f32, sy: f32) -> PointerOutcome {
        match self.gesture {
            Gesture::Node {
                index,
                start,
                offset,
                moved,
            } => {
                let travelled = ((sx - start.0).powi(2) + (sy - start.1).powi(2)).sqrt();
                let moved = moved || travelled > self.config.click_tolerance;
                let (mx, my) = self.viewport.screen_to_model(sx, sy);
                let (px, py) = self.clamp_to_inset(sim, mx + offset.0, my + offset.1);
                sim.pin(index, px, py);
                self.gesture = Gesture::Node {
                    index,
                    start,
                    offset,
                    moved,
                };
                PointerOutcome::DragMoved(index)
            }
            Gesture::Pan { last } => {
                self.viewport.pan(sx - last.0, sy - last.1);
                self.gesture = Gesture::Pan { last: (sx, sy) };
                PointerOutcome::Panned
            }
            Gesture::Idle => {
                let (mx, my) = self.viewport.screen_to_model(sx, sy);
                let hit = sim.node_at(mx, my);
                if hit == self.hovered {
                    PointerOutcome::None
                } else {
                    self.hovered = hit;
                    PointerOutcome::HoverChanged(hit)
                }
            }
        }
    }

    pub fn pointer_up(&mut self, sim: &mut Simulation) -> PointerOutcome {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Node { index, moved, .. } => {
                sim.unpin(index);
                sim.set_alpha_target(0.0);
                if moved {
                    PointerOutcome::DragEnded(index)
                } else {
                    PointerOutcome::Activate(index)
                }
            }
            Gesture::Pan { .. } | Gesture::Idle => PointerOutcome::None,
        }
    }

    /// Pointer left the canvas: end any drag without activating
    pub fn pointer_leave(&mut self, sim: &mut Simulation) -> PointerOutcome {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        self.hovered = None;
        match gesture {
            Gesture::Node { index, .. } => {
                sim.unpin(index);
                sim.set_alpha_target(0.0);
                PointerOutcome::DragEnded(index)
            }
            _ => PointerOutcome::HoverChanged(None),
        }
    }

    /// Wheel zoom around the pointer; positive delta zooms out
    pub fn wheel(&mut self, delta_y: f32, sx: f32, sy: f32) -> PointerOutcome {
        let factor = 2.0_f32.powf(-delta_y * self.config.wheel_sensitivity);
        self.viewport.zoom_at(factor, sx, sy);
        PointerOutcome::Zoomed
    }
}
