//! Graph view session
//!
//! A [`GraphView`] owns everything one mounted graph needs: the built graph,
//! its simulation, the interaction controller, the selection bridge and the
//! host's activation callback. Nothing is shared between views.
//!
//! The host drives it from its event loop: [`GraphView::tick`] once per
//! animation frame, pointer methods from input events, and
//! [`GraphView::take_scroll_request`] / [`GraphView::fulfil_scroll`] for the
//! delayed card scroll.

use serde::Serialize;

use crate::case::{CaseRecord, filter_cases};
use crate::config::GraphConfig;
use crate::error::GraphResult;
use crate::graph::CaseGraph;
use crate::interaction::{InteractionController, PointerOutcome};
use crate::render::{Frame, FrameState, RenderStyle, render_frame};
use crate::selection::{
    Activation, CardHandle, ListKind, ScrollOutcome, ScrollRequest, SelectionBridge,
};
use crate::simulation::{CanvasSize, Simulation};
use crate::stats::CaseStats;

type ActivateCallback = Box<dyn FnMut(&str)>;

/// Settled node position, as exported by the CLI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePosition {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub is_reference: bool,
}

/// An edge by case ids
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeIds {
    pub source: String,
    pub target: String,
}

/// Serializable view of the current layout
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    pub width: f32,
    pub height: f32,
    pub settled: bool,
    pub nodes: Vec<NodePosition>,
    pub edges: Vec<EdgeIds>,
    /// Recovered data problems, as messages
    pub issues: Vec<String>,
}

/// One interactive graph view
pub struct GraphView<H> {
    config: GraphConfig,
    style: RenderStyle,
    graph: CaseGraph,
    size: CanvasSize,
    simulation: Option<Simulation>,
    interaction: InteractionController,
    selection: SelectionBridge<H>,
    pending_scroll: Option<ScrollRequest>,
    on_activate: Option<ActivateCallback>,
    generation: u64,
    closed: bool,
}

impl<H: CardHandle> GraphView<H> {
    /// Create an empty view; call [`set_cases`](Self::set_cases) and
    /// [`resize`](Self::resize) to start a layout
    pub fn new(config: GraphConfig) -> GraphResult<Self> {
        config.validate()?;
        let style = RenderStyle::from_config(&config.render)?;
        let interaction = InteractionController::new(
            config.viewport.clone(),
            config.simulation.drag_alpha_target,
        );
        let selection = SelectionBridge::new(config.selection.breakpoint);
        Ok(Self {
            config,
            style,
            graph: CaseGraph::default(),
            size: CanvasSize::default(),
            simulation: None,
            interaction,
            selection,
            pending_scroll: None,
            on_activate: None,
            generation: 0,
            closed: false,
        })
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn graph(&self) -> &CaseGraph {
        &self.graph
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Incremented whenever the node set or canvas changes
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    pub fn selection(&self) -> &SelectionBridge<H> {
        &self.selection
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// Register the callback fired once per completed click on a case node
    pub fn on_node_activate(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_activate = Some(Box::new(callback));
    }

    /// Replace the node set, stopping the running simulation first
    pub fn set_cases(&mut self, records: &[CaseRecord]) {
        if self.closed {
            tracing::debug!("ignoring new cases for closed view");
            return;
        }
        self.stop_simulation();
        self.graph = CaseGraph::from_records(records);
        self.interaction.cancel();
        self.pending_scroll = None;
        self.selection
            .reset(self.graph.reference().map(|n| n.id.clone()));
        self.generation += 1;
        self.start_simulation();
    }

    /// Show only the cases of `corpus` matching `query`
    pub fn search(&mut self, corpus: &[CaseRecord], query: &str) {
        self.set_cases(&filter_cases(corpus, query));
    }

    /// Update the canvas size; the layout restarts when it changes
    pub fn resize(&mut self, width: f32, height: f32) {
        let size = CanvasSize::new(width, height);
        if self.closed || size == self.size {
            return;
        }
        self.size = size;
        self.stop_simulation();
        self.interaction.cancel();
        self.generation += 1;
        if size.is_measured() {
            self.start_simulation();
        } else {
            tracing::debug!(width, height, "canvas not measured, layout deferred");
        }
    }

    /// Width of the surrounding layout, deciding which card list is visible
    pub fn set_layout_width(&mut self, width: f32) {
        self.selection.set_layout_width(width);
    }

    fn start_simulation(&mut self) {
        if !self.size.is_measured() {
            return;
        }
        self.simulation = Some(Simulation::new(
            &self.graph,
            self.config.simulation.clone(),
            self.config.render.radius_scale,
            self.size,
        ));
    }

    fn stop_simulation(&mut self) {
        if let Some(mut sim) = self.simulation.take() {
            sim.stop();
        }
    }

    /// True while the layout or a view animation still changes frames
    pub fn needs_frame(&self) -> bool {
        self.simulation.as_ref().is_some_and(Simulation::is_running)
            || self.interaction.viewport().is_animating()
    }

    /// Advance one animation frame; returns a frame if anything changed
    pub fn tick(&mut self) -> Option<Frame> {
        let animating = self.interaction.viewport_mut().update_animation();
        let moved = self.simulation.as_mut().is_some_and(Simulation::tick);
        if moved || animating {
            self.frame()
        } else {
            None
        }
    }

    /// Run the layout until it settles or `max_iterations` ticks elapse
    pub fn settle(&mut self, max_iterations: usize) -> usize {
        self.simulation
            .as_mut()
            .map_or(0, |sim| sim.run_to_convergence(max_iterations))
    }

    /// Drawing instructions for the current state
    pub fn frame(&self) -> Option<Frame> {
        let sim = self.simulation.as_ref()?;
        let selected = self
            .selection
            .selected()
            .and_then(|id| self.graph.index_of(id));
        Some(render_frame(
            &self.graph,
            sim,
            self.interaction.viewport().transform(),
            &self.style,
            FrameState {
                generation: self.generation,
                hovered: self.interaction.hovered(),
                selected,
            },
        ))
    }

    pub fn snapshot(&self) -> Option<LayoutSnapshot> {
        let sim = self.simulation.as_ref()?;
        Some(LayoutSnapshot {
            width: self.size.width,
            height: self.size.height,
            settled: sim.alpha() < sim.config().alpha_min,
            nodes: self
                .graph
                .nodes
                .iter()
                .zip(&sim.nodes)
                .map(|(node, pos)| NodePosition {
                    id: node.id.clone(),
                    x: pos.x,
                    y: pos.y,
                    radius: pos.radius,
                    is_reference: node.is_reference,
                })
                .collect(),
            edges: self
                .graph
                .edges
                .iter()
                .map(|e| EdgeIds {
                    source: self.graph.nodes[e.source].id.clone(),
                    target: self.graph.nodes[e.target].id.clone(),
                })
                .collect(),
            issues: self.graph.issues.iter().map(ToString::to_string).collect(),
        })
    }

    pub fn stats(&self) -> CaseStats {
        CaseStats::from_graph(&self.graph, &self.config.stats)
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> PointerOutcome {
        match self.simulation.as_mut() {
            Some(sim) => self.interaction.pointer_down(sim, x, y),
            None => PointerOutcome::None,
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> PointerOutcome {
        match self.simulation.as_mut() {
            Some(sim) => self.interaction.pointer_move(sim, x, y),
            None => PointerOutcome::None,
        }
    }

    /// End a gesture; a click on a case node activates it
    pub fn pointer_up(&mut self) -> PointerOutcome {
        let Some(sim) = self.simulation.as_mut() else {
            return PointerOutcome::None;
        };
        match self.interaction.pointer_up(sim) {
            PointerOutcome::Activate(index) if !self.activate_from_graph(index) => {
                PointerOutcome::None
            }
            outcome => outcome,
        }
    }

    pub fn pointer_leave(&mut self) -> PointerOutcome {
        match self.simulation.as_mut() {
            Some(sim) => self.interaction.pointer_leave(sim),
            None => PointerOutcome::None,
        }
    }

    pub fn wheel(&mut self, delta_y: f32, x: f32, y: f32) -> PointerOutcome {
        self.interaction.wheel(delta_y, x, y)
    }

    fn activate_from_graph(&mut self, index: usize) -> bool {
        let Some(node) = self.graph.nodes.get(index) else {
            return false;
        };
        if node.is_reference {
            return false;
        }
        let id = node.id.clone();
        if !self.activate(&id) {
            return false;
        }
        if let Some(callback) = self.on_activate.as_mut() {
            callback(&id);
        }
        true
    }

    /// Select a case and queue a scroll to its card; false for the reference
    /// node and for ids outside the current graph
    pub fn activate(&mut self, id: &str) -> bool {
        if self.graph.index_of(id).is_none() {
            tracing::debug!(id, "ignoring activation of unknown case");
            return false;
        }
        match self.selection.activate(id) {
            Activation::Ignored => false,
            Activation::Selected { scroll, .. } => {
                self.pending_scroll = Some(scroll);
                true
            }
        }
    }

    /// A card in one of the lists was clicked
    pub fn select_from_list(&mut self, id: &str) -> bool {
        self.activate(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.pending_scroll = None;
    }

    /// The scroll request queued by the last activation
    pub fn take_scroll_request(&mut self) -> Option<ScrollRequest> {
        self.pending_scroll.take()
    }

    pub fn fulfil_scroll(&mut self, request: &ScrollRequest) -> ScrollOutcome {
        self.selection.fulfil(request)
    }

    pub fn register_card(&mut self, list: ListKind, id: impl Into<String>, handle: H) {
        self.selection.register(list, id, handle);
    }

    pub fn unregister_card(&mut self, list: ListKind, id: &str) -> Option<H> {
        self.selection.unregister(list, id)
    }

    pub fn unmount_list(&mut self, list: ListKind) {
        self.selection.unmount(list);
    }

    /// Animate the viewport to show every node
    pub fn fit_view(&mut self) {
        if let Some(sim) = self.simulation.as_ref() {
            let padding = self.config.viewport.fit_padding;
            self.interaction
                .viewport_mut()
                .fit_to_bounds(&sim.bounds(), self.size, padding);
        }
    }

    pub fn reset_view(&mut self) {
        self.interaction.viewport_mut().reset();
    }

    /// Stop the simulation and release the callback and card handles
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.stop_simulation();
        self.selection.clear();
        self.selection.unmount(ListKind::Compact);
        self.selection.unmount(ListKind::Full);
        self.pending_scroll = None;
        self.on_activate = None;
        self.interaction.cancel();
        self.closed = true;
        tracing::debug!("closed graph view");
    }
}
