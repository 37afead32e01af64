//! Viewport transform for pan and zoom
//!
//! The transform maps model space to screen space as
//! `screen = model * scale + translate`, applied to the whole rendered group.
//! Node positions in the simulation are never touched by it.
//!
//! This module contains pure calculation logic that can be unit tested
//! without browser dependencies.

use crate::config::ViewportConfig;
use crate::simulation::CanvasSize;

/// A 2D translate + uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    /// SVG `transform` attribute value
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Viewport state owned by the interaction controller
#[derive(Debug, Clone)]
pub struct Viewport {
    transform: Transform,
    min_scale: f32,
    max_scale: f32,
    /// Target for animated zoom-to-fit
    target: Option<Transform>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&ViewportConfig::default())
    }
}

impl Viewport {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            transform: Transform::IDENTITY,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            target: None,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn scale(&self) -> f32 {
        self.transform.k
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// Convert model coordinates to screen coordinates
    pub fn model_to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        let t = self.transform;
        (x * t.k + t.x, y * t.k + t.y)
    }

    /// Convert screen coordinates to model coordinates
    pub fn screen_to_model(&self, sx: f32, sy: f32) -> (f32, f32) {
        let t = self.transform;
        ((sx - t.x) / t.k, (sy - t.y) / t.k)
    }

    /// Pan the view by delta screen pixels
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.transform.x += dx;
        self.transform.y += dy;
        // A gesture always wins over a running animation
        self.target = None;
    }

    /// Zoom by `factor`, keeping the model point under the anchor fixed
    pub fn zoom_at(&mut self, factor: f32, anchor_x: f32, anchor_y: f32) {
        let (mx, my) = self.screen_to_model(anchor_x, anchor_y);
        let k = (self.transform.k * factor).clamp(self.min_scale, self.max_scale);
        self.transform = Transform {
            x: anchor_x - mx * k,
            y: anchor_y - my * k,
            k,
        };
        self.target = None;
    }

    /// Zoom about the canvas centre
    pub fn zoom(&mut self, factor: f32, size: CanvasSize) {
        let (cx, cy) = size.center();
        self.zoom_at(factor, cx, cy);
    }

    /// Reset view to the identity transform
    pub fn reset(&mut self) {
        self.transform = Transform::IDENTITY;
        self.target = None;
    }

    /// Set an animation target that fits `bounds` into the canvas
    pub fn fit_to_bounds(&mut self, bounds: &BoundingBox, size: CanvasSize, padding: f32) {
        if bounds.is_empty() || !size.is_measured() {
            return;
        }

        let available_width = (size.width - 2.0 * padding).max(1.0);
        let available_height = (size.height - 2.0 * padding).max(1.0);
        let (extent_x, extent_y) = bounds.extent();
        let k = (available_width / extent_x)
            .min(available_height / extent_y)
            .clamp(self.min_scale, self.max_scale);

        let (cx, cy) = size.center();
        let (bx, by) = bounds.center();
        self.target = Some(Transform {
            x: cx - bx * k,
            y: cy - by * k,
            k,
        });
    }

    /// Advance the zoom-to-fit animation; returns true while still animating
    pub fn update_animation(&mut self) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        // Smooth interpolation factor (higher = faster)
        let lerp_factor = 0.12;
        let t = &mut self.transform;
        t.k += (target.k - t.k) * lerp_factor;
        t.x += (target.x - t.x) * lerp_factor;
        t.y += (target.y - t.y) * lerp_factor;

        if (target.k - t.k).abs() < 0.001
            && (target.x - t.x).abs() < 0.1
            && (target.y - t.y).abs() < 0.1
        {
            // Snap to final values
            self.transform = target;
            self.target = None;
        }

        self.target.is_some()
    }
}

/// Model-space extent covered by the node discs; `fit_to_bounds` zooms to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    /// Extent of a layout with no nodes; any disc grows it
    pub fn empty() -> Self {
        Self {
            min_x: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            min_y: f32::INFINITY,
            max_y: f32::NEG_INFINITY,
        }
    }

    /// True until a node disc has been included
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Grow to cover a node of `radius` centred at `(x, y)`
    pub fn include_circle(&mut self, x: f32, y: f32, radius: f32) {
        self.min_x = self.min_x.min(x - radius);
        self.max_x = self.max_x.max(x + radius);
        self.min_y = self.min_y.min(y - radius);
        self.max_y = self.max_y.max(y + radius);
    }

    /// Width and height, floored at one model unit so a fit never divides by zero
    pub fn extent(&self) -> (f32, f32) {
        (
            (self.max_x - self.min_x).max(1.0),
            (self.max_y - self.min_y).max(1.0),
        )
    }

    /// Point the viewport centres on when fitting
    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}
