//! Grid-placed directed graph diagram with keyboard focus navigation.

mod animation;
mod component;
mod config;
mod error;
mod focus;
mod geometry;
mod path;
mod render;
mod routing;
mod scene;
mod state;
mod store;
mod types;

pub use animation::{Clock, ManualClock};
pub use component::{DiagramCanvas, PerformanceClock};
pub use config::{DiagramConfig, Theme};
pub use error::MountError;
pub use geometry::{Grid, cell_anchor, horizontal_spacing};
pub use path::PathData;
pub use routing::{Endpoint, route_path};
pub use scene::{RetainedScene, Scene, Shape, ShapeHandle, ShapeKind};
pub use state::Diagram;
pub use types::{
	DiagramData, DiagramNode, Direction, EdgeKey, FocusTarget, KnobDirection, NavigationLevel, Node,
	NodeId, Point,
};
