//! casegraph - An interactive force-directed layout engine for related legal cases.
//!
//! Case records become nodes sized by similarity and coloured by year, joined by
//! their declared relations. A [`view::GraphView`] runs the force simulation,
//! translates pointer gestures, keeps graph and card-list selection in sync, and
//! emits renderer-neutral [`render::Frame`]s each animation tick.

pub mod case;
pub mod config;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod logging;
pub mod render;
pub mod selection;
pub mod simulation;
pub mod stats;
pub mod svg;
pub mod view;
pub mod viewport;

pub use case::CaseRecord;
pub use config::GraphConfig;
pub use error::{GraphError, GraphIssue, GraphResult};
pub use view::GraphView;
