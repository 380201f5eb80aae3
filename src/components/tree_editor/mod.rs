//! Decision tree editor: a labelled multigraph edited on a 2D canvas.

mod component;
pub mod error;
pub mod geometry;
mod render;
pub mod serialize;
pub mod state;
pub mod store;
pub mod sync;
pub mod types;

pub use component::DecisionTreeEditor;
pub use error::{EditorError, Result};
pub use serialize::{ImportReport, TreeDocument};
pub use state::{Command, Interaction, TreeEditor};
pub use store::GraphStore;
pub use types::{Color, Connection, ConnectionKey, EditorConfig, Node, NodeId};
