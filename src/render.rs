//! Render adapter: simulation state to drawing primitives
//!
//! [`render_frame`] is a pure function of node positions, the viewport
//! transform and node attributes. It never touches the simulation, so the
//! same frame can be painted to a canvas or exported as SVG.

use crate::config::RenderConfig;
use crate::error::{GraphError, GraphResult};
use crate::graph::CaseGraph;
use crate::simulation::Simulation;
use crate::viewport::Transform;

/// An sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> GraphResult<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GraphError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| GraphError::InvalidColor(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise interpolation, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

/// Sequential colour scale over a year domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearColorScale {
    domain: Option<(i32, i32)>,
    old: Rgb,
    new: Rgb,
}

impl YearColorScale {
    pub fn new(domain: Option<(i32, i32)>, old: Rgb, new: Rgb) -> Self {
        Self { domain, old, new }
    }

    pub fn color(&self, year: i32) -> Rgb {
        let t = match self.domain {
            Some((min, max)) if max > min => (year - min) as f32 / (max - min) as f32,
            // Degenerate domain: every year sits in the middle
            _ => 0.5,
        };
        self.old.lerp(self.new, t)
    }
}

/// Truncate to `max_chars` characters, appending `...` when shortened
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Parsed visual parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub radius_scale: f32,
    pub label_max_chars: usize,
    pub label_gap: f32,
    pub old_color: Rgb,
    pub new_color: Rgb,
    pub reference_fill: Rgb,
    pub node_stroke: Rgb,
    pub edge_color: Rgb,
    pub edge_opacity: f32,
    pub edge_width: f32,
}

impl RenderStyle {
    pub fn from_config(config: &RenderConfig) -> GraphResult<Self> {
        Ok(Self {
            radius_scale: config.radius_scale,
            label_max_chars: config.label_max_chars,
            label_gap: config.label_gap,
            old_color: Rgb::from_hex(&config.old_color)?,
            new_color: Rgb::from_hex(&config.new_color)?,
            reference_fill: Rgb::from_hex(&config.reference_fill)?,
            node_stroke: Rgb::from_hex(&config.node_stroke)?,
            edge_color: Rgb::from_hex(&config.edge_color)?,
            edge_opacity: 0.6,
            edge_width: 2.0,
        })
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            radius_scale: 30.0,
            label_max_chars: 25,
            label_gap: 20.0,
            old_color: Rgb::new(0x99, 0xe1, 0xb5),
            new_color: Rgb::new(0x1a, 0x47, 0x31),
            reference_fill: Rgb::new(0xf1, 0xf5, 0xf9),
            node_stroke: Rgb::new(0x64, 0x74, 0x8b),
            edge_color: Rgb::new(0x99, 0x99, 0x99),
            edge_opacity: 0.6,
            edge_width: 2.0,
        }
    }
}

/// A line between two node centres, in model space
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLine {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub width: f32,
}

/// Text drawn centred at a model-space point
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// Everything needed to draw one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGlyph {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f32,
    pub opacity: f32,
    /// Similarity percentage drawn inside the circle
    pub badge: Option<String>,
    pub label: Label,
    /// Untruncated name, shown while hovered
    pub tooltip: Option<String>,
    pub hovered: bool,
    pub selected: bool,
    pub is_reference: bool,
}

/// Drawing instructions for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Incremented whenever the node set is replaced
    pub generation: u64,
    pub transform: Transform,
    /// Drawn first, underneath the nodes
    pub edges: Vec<EdgeLine>,
    pub nodes: Vec<NodeGlyph>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Per-frame interaction state
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameState {
    pub generation: u64,
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
}

/// Build drawing instructions for the current simulation state
///
/// `graph` and `sim` must describe the same node set in the same order.
pub fn render_frame(
    graph: &CaseGraph,
    sim: &Simulation,
    transform: Transform,
    style: &RenderStyle,
    state: FrameState,
) -> Frame {
    let colors = YearColorScale::new(graph.year_range(), style.old_color, style.new_color);

    let edges = sim
        .edges
        .iter()
        .map(|e| {
            let (s, t) = (&sim.nodes[e.source], &sim.nodes[e.target]);
            EdgeLine {
                x1: s.x,
                y1: s.y,
                x2: t.x,
                y2: t.y,
                color: style.edge_color,
                opacity: style.edge_opacity,
                width: style.edge_width,
            }
        })
        .collect();

    let nodes = graph
        .nodes
        .iter()
        .zip(&sim.nodes)
        .enumerate()
        .map(|(i, (node, pos))| {
            let hovered = state.hovered == Some(i);
            let (fill, base_stroke, badge) = if node.is_reference {
                (style.reference_fill, 1.0, None)
            } else {
                let percent = (node.weight * 100.0).round() as i32;
                (colors.color(node.year), 2.0, Some(format!("{percent}%")))
            };
            NodeGlyph {
                id: node.id.clone(),
                x: pos.x,
                y: pos.y,
                radius: pos.radius,
                fill,
                stroke: style.node_stroke,
                stroke_width: if hovered { 3.0 } else { base_stroke },
                opacity: if hovered { 1.0 } else { 0.9 },
                badge,
                label: Label {
                    text: truncate_label(&node.label, style.label_max_chars),
                    x: pos.x,
                    y: pos.y + pos.radius + style.label_gap,
                },
                tooltip: hovered.then(|| node.label.clone()),
                hovered,
                selected: state.selected == Some(i),
                is_reference: node.is_reference,
            }
        })
        .collect();

    Frame {
        generation: state.generation,
        transform,
        edges,
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseRecord;
    use crate::config::SimulationConfig;
    use crate::simulation::CanvasSize;

    fn frame_for(records: &[CaseRecord], state: FrameState) -> Frame {
        let graph = CaseGraph::from_records(records);
        let sim = Simulation::new(
            &graph,
            SimulationConfig::default(),
            30.0,
            CanvasSize::new(800.0, 600.0),
        );
        render_frame(
            &graph,
            &sim,
            Transform::IDENTITY,
            &RenderStyle::default(),
            state,
        )
    }

    #[test]
    fn hex_round_trip_and_errors() {
        let c = Rgb::from_hex("#99E1B5").unwrap();
        assert_eq!(c, Rgb::new(0x99, 0xe1, 0xb5));
        assert_eq!(c.to_hex(), "#99e1b5");
        assert_eq!(Rgb::from_hex("1a4731").unwrap(), Rgb::new(0x1a, 0x47, 0x31));

        for bad in ["", "#fff", "#gggggg", "#1234567", "#ééé"] {
            assert!(
                matches!(Rgb::from_hex(bad), Err(GraphError::InvalidColor(ref s)) if s == bad),
                "{bad}"
            );
        }
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Rgb::new(0, 100, 200);
        let b = Rgb::new(100, 0, 200);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgb::new(50, 50, 200));
        assert_eq!(a.lerp(b, f32::NAN), a);
    }

    #[test]
    fn year_scale_spans_domain() {
        let style = RenderStyle::default();
        let scale = YearColorScale::new(Some((2015, 2023)), style.old_color, style.new_color);
        assert_eq!(scale.color(2015), style.old_color);
        assert_eq!(scale.color(2023), style.new_color);
        assert_eq!(scale.color(1990), style.old_color);
    }

    #[test]
    fn single_year_maps_to_midpoint() {
        let style = RenderStyle::default();
        let scale = YearColorScale::new(Some((2020, 2020)), style.old_color, style.new_color);
        let mid = style.old_color.lerp(style.new_color, 0.5);

        assert_eq!(scale.color(2020), mid);
        assert_eq!(scale.color(2020), scale.color(2020));
        assert_eq!(YearColorScale::new(None, style.old_color, style.new_color).color(2020), mid);
    }

    #[test]
    fn labels_truncate_by_characters() {
        assert_eq!(truncate_label("Short name", 25), "Short name");
        assert_eq!(
            truncate_label("Exactly twenty-five chars", 25),
            "Exactly twenty-five chars"
        );
        assert_eq!(
            truncate_label("A considerably longer case name", 25),
            "A considerably longer cas..."
        );
        assert_eq!(truncate_label("Überweisungsgebühr", 5), "Überw...");
    }

    #[test]
    fn two_node_frame() {
        let frame = frame_for(
            &[
                CaseRecord::new("A", 2015, 0.9).with_related(["B"]),
                CaseRecord::new("B", 2023, 0.5),
            ],
            FrameState::default(),
        );

        assert_eq!(frame.edges.len(), 1);
        assert_eq!(frame.nodes.len(), 2);

        let (a, b) = (&frame.nodes[0], &frame.nodes[1]);
        assert_eq!(a.fill, RenderStyle::default().old_color);
        assert_eq!(b.fill, RenderStyle::default().new_color);
        assert!((a.radius - 27.0).abs() < 1e-4);
        assert!((b.radius - 15.0).abs() < 1e-4);
        assert_eq!(a.badge.as_deref(), Some("90%"));
        assert_eq!(b.badge.as_deref(), Some("50%"));
        assert_eq!(a.label.y, a.y + a.radius + 20.0);
        assert_eq!(frame.edges[0].x1, a.x);
        assert_eq!(frame.edges[0].x2, b.x);
    }

    #[test]
    fn reference_node_is_styled_apart() {
        let frame = frame_for(
            &[
                CaseRecord::new("REF", 2024, 1.0).as_reference(),
                CaseRecord::new("A", 2015, 0.9),
            ],
            FrameState::default(),
        );

        let reference = &frame.nodes[0];
        assert!(reference.is_reference);
        assert_eq!(reference.fill, RenderStyle::default().reference_fill);
        assert_eq!(reference.stroke_width, 1.0);
        assert_eq!(reference.badge, None);
        assert_eq!(frame.nodes[1].stroke_width, 2.0);
    }

    #[test]
    fn hover_and_selection_flags() {
        let long = "A case name well beyond twenty-five characters";
        let frame = frame_for(
            &[
                CaseRecord::new("A", 2015, 0.9).with_name(long),
                CaseRecord::new("B", 2023, 0.5),
            ],
            FrameState {
                generation: 7,
                hovered: Some(0),
                selected: Some(1),
            },
        );

        let (a, b) = (&frame.nodes[0], &frame.nodes[1]);
        assert_eq!(frame.generation, 7);
        assert!(a.hovered && !a.selected);
        assert_eq!(a.stroke_width, 3.0);
        assert_eq!(a.opacity, 1.0);
        assert_eq!(a.tooltip.as_deref(), Some(long));
        assert!(a.label.text.ends_with("..."));
        assert!(b.selected && b.tooltip.is_none());
    }

    #[test]
    fn empty_graph_renders_nothing() {
        let frame = frame_for(&[], FrameState::default());
        assert!(frame.is_empty());
        assert!(frame.edges.is_empty());
    }
}
