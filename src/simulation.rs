//! CPU force simulation for case layout
//!
//! A d3-force style solver: every tick accumulates link, many-body,
//! collision, centering and per-axis forces into node velocities, applies
//! velocity decay, integrates positions and clamps every node inside the
//! canvas. `alpha` anneals toward `alpha_target`; the layout is settled once
//! it drops below `alpha_min`.
//!
//! All coordinates are in model space (canvas pixels before the viewport
//! transform).

use std::collections::HashMap;

use crate::config::SimulationConfig;
use crate::graph::CaseGraph;
use crate::viewport::BoundingBox;

/// Canvas size in device-independent pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False until the host has measured a non-empty canvas
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// A node with position and velocity for simulation
#[derive(Debug, Clone)]
pub struct SimNode {
    /// Node ID (from GraphNode)
    pub id: String,
    /// Position in model space
    pub x: f32,
    pub y: f32,
    /// Velocity
    pub vx: f32,
    pub vy: f32,
    /// Pinned position, present only while a drag holds the node
    pub fx: Option<f32>,
    pub fy: Option<f32>,
    /// Radius for rendering
    pub radius: f32,
    /// Radius used for collision and boundary clamping
    pub collision_radius: f32,
}

impl SimNode {
    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// An edge for simulation (indices into node array)
#[derive(Debug, Clone)]
pub struct SimEdge {
    pub source: usize,
    pub target: usize,
    /// Spring strength, weaker for well-connected endpoints
    strength: f32,
    /// Share of the correction applied to the target
    bias: f32,
}

/// CPU force simulation
pub struct Simulation {
    pub nodes: Vec<SimNode>,
    pub edges: Vec<SimEdge>,
    config: SimulationConfig,
    size: CanvasSize,
    alpha: f32,
    alpha_target: f32,
    stopped: bool,
    node_id_to_index: HashMap<String, usize>,
}

impl Simulation {
    /// Create a simulation for `graph` on a canvas of the given size
    ///
    /// `radius_scale` converts similarity weight into render radius; the
    /// collision radius adds `config.collision_padding` on top.
    pub fn new(
        graph: &CaseGraph,
        config: SimulationConfig,
        radius_scale: f32,
        size: CanvasSize,
    ) -> Self {
        let (cx, cy) = size.center();
        let initial_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());

        // Phyllotaxis spiral around the canvas centre
        let nodes: Vec<SimNode> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let spiral = 10.0 * (0.5 + i as f32).sqrt();
                let angle = i as f32 * initial_angle;
                let radius = n.weight * radius_scale;
                SimNode {
                    id: n.id.clone(),
                    x: cx + spiral * angle.cos(),
                    y: cy + spiral * angle.sin(),
                    vx: 0.0,
                    vy: 0.0,
                    fx: None,
                    fy: None,
                    radius,
                    collision_radius: radius + config.collision_padding,
                }
            })
            .collect();

        let degrees = graph.degrees();
        let edges: Vec<SimEdge> = graph
            .edges
            .iter()
            .map(|e| {
                let (ds, dt) = (degrees[e.source] as f32, degrees[e.target] as f32);
                SimEdge {
                    source: e.source,
                    target: e.target,
                    strength: config.link_strength / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        let node_id_to_index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut sim = Self {
            nodes,
            edges,
            config,
            size,
            alpha: 1.0,
            alpha_target: 0.0,
            stopped: false,
            node_id_to_index,
        };
        sim.clamp_to_canvas();
        tracing::debug!(
            nodes = sim.nodes.len(),
            edges = sim.edges.len(),
            width = size.width,
            height = size.height,
            "started simulation"
        );
        sim
    }

    /// Check if simulation is still running
    pub fn is_running(&self) -> bool {
        !self.stopped
            && !self.nodes.is_empty()
            && (self.alpha >= self.config.alpha_min || self.alpha_target >= self.config.alpha_min)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_id_to_index.get(id).copied()
    }

    /// Set the temperature alpha anneals toward; a positive target reheats
    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target;
    }

    /// Halt this instance for good; later ticks never move a node
    pub fn stop(&mut self) {
        if !self.stopped {
            tracing::debug!(nodes = self.nodes.len(), "stopped simulation");
        }
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Pin a node at a model-space position
    pub fn pin(&mut self, index: usize, x: f32, y: f32) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.fx = Some(x);
            node.fy = Some(y);
        }
    }

    /// Release a pinned node back into the simulation
    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.fx = None;
            node.fy = None;
        }
    }

    /// Largest render radius in the set (0 for an empty set)
    pub fn max_radius(&self) -> f32 {
        self.nodes.iter().map(|n| n.radius).fold(0.0, f32::max)
    }

    /// Topmost node whose render disc contains the model-space point
    pub fn node_at(&self, x: f32, y: f32) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| {
                let dist_sq = (x - n.x).powi(2) + (y - n.y).powi(2);
                (dist_sq <= n.radius * n.radius).then_some((i, dist_sq))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Bounding box of all node discs
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for node in &self.nodes {
            bounds.include_circle(node.x, node.y, node.radius);
        }
        bounds
    }

    /// Run one simulation tick; returns false when nothing moved
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        self.apply_link_force();
        self.apply_many_body_force();
        self.apply_collision_force();
        self.apply_center_force();
        self.apply_axis_force();

        let decay = self.config.velocity_decay;
        for node in &mut self.nodes {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= decay;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= decay;
                    node.y += node.vy;
                }
            }
        }

        self.clamp_to_canvas();
        true
    }

    /// Run simulation to convergence (or max iterations)
    pub fn run_to_convergence(&mut self, max_iterations: usize) -> usize {
        let mut iterations = 0;
        while iterations < max_iterations && self.tick() {
            iterations += 1;
        }
        iterations
    }

    /// Spring force between connected nodes
    fn apply_link_force(&mut self) {
        let distance = self.config.link_distance;
        for (k, edge) in self.edges.iter().enumerate() {
            let (s, t) = (edge.source, edge.target);
            let mut dx =
                self.nodes[t].x + self.nodes[t].vx - self.nodes[s].x - self.nodes[s].vx;
            let mut dy =
                self.nodes[t].y + self.nodes[t].vy - self.nodes[s].y - self.nodes[s].vy;
            if dx == 0.0 {
                dx = jiggle(s, k);
            }
            if dy == 0.0 {
                dy = jiggle(t, k);
            }

            let dist = (dx * dx + dy * dy).sqrt();
            let l = (dist - distance) / dist * self.alpha * edge.strength;
            let (fx, fy) = (dx * l, dy * l);

            self.nodes[t].vx -= fx * edge.bias;
            self.nodes[t].vy -= fy * edge.bias;
            self.nodes[s].vx += fx * (1.0 - edge.bias);
            self.nodes[s].vy += fy * (1.0 - edge.bias);
        }
    }

    /// Repulsion between all node pairs
    fn apply_many_body_force(&mut self) {
        let n = self.nodes.len();
        let distance_min_sq = self.config.distance_min * self.config.distance_min;
        let strength = self.config.charge * self.alpha;

        for i in 0..n {
            for j in (i + 1)..n {
                let mut dx = self.nodes[j].x - self.nodes[i].x;
                let mut dy = self.nodes[j].y - self.nodes[i].y;
                if dx == 0.0 {
                    dx = jiggle(i, j);
                }
                if dy == 0.0 {
                    dy = jiggle(j, i);
                }

                let mut dist_sq = dx * dx + dy * dy;
                if dist_sq < distance_min_sq {
                    dist_sq = (distance_min_sq * dist_sq).sqrt();
                }

                let w = strength / dist_sq;
                self.nodes[i].vx += dx * w;
                self.nodes[i].vy += dy * w;
                self.nodes[j].vx -= dx * w;
                self.nodes[j].vy -= dy * w;
            }
        }
    }

    /// Push overlapping collision discs apart
    fn apply_collision_force(&mut self) {
        let n = self.nodes.len();
        let strength = self.config.collision_strength;

        for i in 0..n {
            let ri = self.nodes[i].collision_radius;
            let xi = self.nodes[i].x + self.nodes[i].vx;
            let yi = self.nodes[i].y + self.nodes[i].vy;

            for j in (i + 1)..n {
                let rj = self.nodes[j].collision_radius;
                let r = ri + rj;
                let mut dx = xi - self.nodes[j].x - self.nodes[j].vx;
                let mut dy = yi - self.nodes[j].y - self.nodes[j].vy;
                let mut dist_sq = dx * dx + dy * dy;
                if dist_sq >= r * r {
                    continue;
                }

                if dx == 0.0 {
                    dx = jiggle(i, j);
                    dist_sq += dx * dx;
                }
                if dy == 0.0 {
                    dy = jiggle(j, i);
                    dist_sq += dy * dy;
                }
                let dist = dist_sq.sqrt();
                let l = (r - dist) / dist * strength;
                let (px, py) = (dx * l, dy * l);

                // Smaller discs move further
                let share = (rj * rj) / (ri * ri + rj * rj);
                self.nodes[i].vx += px * share;
                self.nodes[i].vy += py * share;
                self.nodes[j].vx -= px * (1.0 - share);
                self.nodes[j].vy -= py * (1.0 - share);
            }
        }
    }

    /// Shift the centroid toward the canvas centre
    fn apply_center_force(&mut self) {
        let n = self.nodes.len() as f32;
        let (cx, cy) = self.size.center();
        let (sx, sy) = self
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let shift_x = (sx / n - cx) * self.config.center_strength;
        let shift_y = (sy / n - cy) * self.config.center_strength;

        for node in &mut self.nodes {
            node.x -= shift_x;
            node.y -= shift_y;
        }
    }

    /// Independent pull toward the centre on each axis
    fn apply_axis_force(&mut self) {
        let (cx, cy) = self.size.center();
        let k = self.config.axis_strength * self.alpha;
        for node in &mut self.nodes {
            node.vx += (cx - node.x) * k;
            node.vy += (cy - node.y) * k;
        }
    }

    /// Keep every node disc inside the canvas
    fn clamp_to_canvas(&mut self) {
        let CanvasSize { width, height } = self.size;
        for node in &mut self.nodes {
            let r = node.collision_radius;
            node.x = clamp_axis(node.x, r, width);
            node.y = clamp_axis(node.y, r, height);
        }
    }
}

/// Clamp a coordinate to `[r, extent - r]`, centring when the disc cannot fit
pub(crate) fn clamp_axis(value: f32, r: f32, extent: f32) -> f32 {
    if !value.is_finite() || 2.0 * r >= extent {
        return extent / 2.0;
    }
    value.clamp(r, extent - r)
}

/// Tiny deterministic offset used to separate coincident nodes
fn jiggle(a: usize, b: usize) -> f32 {
    let phase = (a as f32 * 0.618_034 + b as f32 * 0.414_214).fract();
    let offset = (phase - 0.5) * 1e-6;
    if offset == 0.0 { 1e-7 } else { offset }
}
