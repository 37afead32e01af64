//! SVG export of a rendered frame

use std::fs;
use std::path::Path;

use askama::Template;

use crate::error::{GraphError, GraphResult};
use crate::render::Frame;
use crate::simulation::CanvasSize;

const BACKGROUND: &str = "#f8fafc";

/// Edge attributes, preformatted for the template
#[derive(Debug, Clone)]
pub struct SvgEdge {
    pub x1: String,
    pub y1: String,
    pub x2: String,
    pub y2: String,
    pub stroke: String,
    pub opacity: String,
    pub width: String,
}

/// Node attributes, preformatted for the template
#[derive(Debug, Clone)]
pub struct SvgNode {
    pub id: String,
    pub class: &'static str,
    pub x: String,
    pub y: String,
    pub radius: String,
    pub ring_radius: String,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: String,
    pub opacity: String,
    /// Empty when the node has no badge
    pub badge: String,
    pub label: String,
    pub label_dy: String,
    pub title: String,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "graph.svg")]
struct GraphSvgTemplate<'a> {
    width: String,
    height: String,
    background: &'a str,
    transform: String,
    edges: &'a [SvgEdge],
    nodes: &'a [SvgNode],
}

/// Format a coordinate with at most two decimals
fn num(value: f32) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Render a frame as a standalone SVG document
pub fn render_svg(frame: &Frame, size: CanvasSize) -> GraphResult<String> {
    let edges: Vec<SvgEdge> = frame
        .edges
        .iter()
        .map(|e| SvgEdge {
            x1: num(e.x1),
            y1: num(e.y1),
            x2: num(e.x2),
            y2: num(e.y2),
            stroke: e.color.to_hex(),
            opacity: num(e.opacity),
            width: num(e.width),
        })
        .collect();

    let nodes: Vec<SvgNode> = frame
        .nodes
        .iter()
        .map(|n| SvgNode {
            id: n.id.clone(),
            class: if n.is_reference { "node reference" } else { "node" },
            x: num(n.x),
            y: num(n.y),
            radius: num(n.radius),
            ring_radius: num(n.radius + 5.0),
            fill: n.fill.to_hex(),
            stroke: n.stroke.to_hex(),
            stroke_width: num(n.stroke_width),
            opacity: num(n.opacity),
            badge: n.badge.clone().unwrap_or_default(),
            label: n.label.text.clone(),
            label_dy: num(n.label.y - n.y),
            title: n.tooltip.clone().unwrap_or_else(|| n.label.text.clone()),
            selected: n.selected,
        })
        .collect();

    let t = frame.transform;
    let template = GraphSvgTemplate {
        width: num(size.width),
        height: num(size.height),
        background: BACKGROUND,
        transform: format!("translate({},{}) scale({})", num(t.x), num(t.y), num(t.k)),
        edges: &edges,
        nodes: &nodes,
    };
    Ok(template.render()?)
}

/// Render a frame and write it to `path`
pub fn write_svg(frame: &Frame, size: CanvasSize, path: &Path) -> GraphResult<()> {
    let svg = render_svg(frame, size)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
    }
    fs::write(path, svg).map_err(|e| GraphError::io(path, e))?;
    tracing::info!(path = %path.display(), nodes = frame.nodes.len(), "wrote SVG");
    Ok(())
}
