//! Engine configuration
//!
//! Every tunable constant lives here so a host can override it from a YAML
//! file. Missing sections and fields fall back to the defaults below.
//!
//! ```yaml
//! simulation:
//!   charge: -800
//! viewport:
//!   max_scale: 6
//! selection:
//!   breakpoint: 640
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::render::Rgb;

/// Force simulation parameters (d3-force semantics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Many-body strength (negative = repulsion)
    pub charge: f32,
    /// Minimum distance used by the many-body force
    pub distance_min: f32,
    /// Link rest length
    pub link_distance: f32,
    /// Link strength multiplier, divided by the smaller endpoint degree
    pub link_strength: f32,
    /// Extra collision radius on top of the render radius
    pub collision_padding: f32,
    /// Collision strength in [0, 1]
    pub collision_strength: f32,
    /// Centroid centering strength in [0, 1]
    pub center_strength: f32,
    /// Per-axis pull toward the canvas centre
    pub axis_strength: f32,
    /// Fraction of velocity kept after each tick
    pub velocity_decay: f32,
    /// Alpha below which the simulation is settled
    pub alpha_min: f32,
    /// Alpha decay rate per tick
    pub alpha_decay: f32,
    /// Alpha target while a node is being dragged
    pub drag_alpha_target: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            charge: -1000.0,
            distance_min: 1.0,
            link_distance: 30.0,
            link_strength: 1.0,
            collision_padding: 4.0,
            collision_strength: 1.0,
            center_strength: 1.0,
            axis_strength: 0.3,
            velocity_decay: 0.6,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            drag_alpha_target: 0.3,
        }
    }
}

/// Viewport and gesture parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    /// Wheel delta to zoom exponent (base 2)
    pub wheel_sensitivity: f32,
    /// Pointer travel in pixels below which a press counts as a click
    pub click_tolerance: f32,
    /// Gap added to the largest render radius to form the drag inset
    pub drag_padding: f32,
    /// Padding used by zoom-to-fit
    pub fit_padding: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 4.0,
            wheel_sensitivity: 0.002,
            click_tolerance: 3.0,
            drag_padding: 20.0,
            fit_padding: 40.0,
        }
    }
}

/// Visual mapping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render radius = weight * radius_scale
    pub radius_scale: f32,
    /// Maximum label length in characters before truncation
    pub label_max_chars: usize,
    /// Gap between the circle and its label
    pub label_gap: f32,
    /// Colour of the oldest year
    pub old_color: String,
    /// Colour of the newest year
    pub new_color: String,
    pub reference_fill: String,
    pub node_stroke: String,
    pub edge_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            radius_scale: 30.0,
            label_max_chars: 25,
            label_gap: 20.0,
            old_color: "#99E1B5".to_string(),
            new_color: "#1A4731".to_string(),
            reference_fill: "#f1f5f9".to_string(),
            node_stroke: "#64748b".to_string(),
            edge_color: "#999999".to_string(),
        }
    }
}

/// Card list synchronisation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Layout width below which the compact list is the visible one
    pub breakpoint: f32,
    /// Delay before a scroll request is fulfilled
    pub scroll_delay_ms: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            breakpoint: 768.0,
            scroll_delay_ms: 100,
        }
    }
}

/// Summary statistics parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Cases from this year on count as recent
    pub recent_since_year: i32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            recent_since_year: 2020,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub simulation: SimulationConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
    pub selection: SelectionConfig,
    pub stats: StatsConfig,
}

impl GraphConfig {
    /// Parse and validate a YAML configuration document
    pub fn from_yaml_str(yaml: &str) -> GraphResult<Self> {
        let config: GraphConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> GraphResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check value ranges and colour strings
    pub fn validate(&self) -> GraphResult<()> {
        let viewport = &self.viewport;
        if !(viewport.min_scale > 0.0 && viewport.min_scale <= viewport.max_scale) {
            return Err(GraphError::InvalidValue {
                field: "viewport.min_scale",
                reason: format!(
                    "scale range [{}, {}] must be positive and ordered",
                    viewport.min_scale, viewport.max_scale
                ),
            });
        }
        if !(self.render.radius_scale > 0.0) {
            return Err(GraphError::InvalidValue {
                field: "render.radius_scale",
                reason: "must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.simulation.velocity_decay) {
            return Err(GraphError::InvalidValue {
                field: "simulation.velocity_decay",
                reason: "must be within [0, 1]".to_string(),
            });
        }
        if !(self.simulation.alpha_min > 0.0) {
            return Err(GraphError::InvalidValue {
                field: "simulation.alpha_min",
                reason: "must be positive".to_string(),
            });
        }
        if self.simulation.collision_padding < 0.0 {
            return Err(GraphError::InvalidValue {
                field: "simulation.collision_padding",
                reason: "collision radius must not be smaller than the render radius".to_string(),
            });
        }
        let render = &self.render;
        for color in [
            &render.old_color,
            &render.new_color,
            &render.reference_fill,
            &render.node_stroke,
            &render.edge_color,
        ] {
            Rgb::from_hex(color)?;
        }
        Ok(())
    }
}
