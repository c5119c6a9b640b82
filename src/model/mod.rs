//! # BEL Graph Model
//!
//! Plain data types shared by the parser, the graph builder and the exporter.
//! Nothing here does I/O or talks to the namespace oracle.

pub mod context;
pub mod node;
pub mod relationship;
pub mod variant;

pub use context::{Annotations, Citation, Context, CITATION_TYPES};
pub use node::{BelNode, Entity, Function, NodeData, NodeId, BEL_DEFAULT_NAMESPACE};
pub use relationship::{EdgeData, EdgeKey, Effect, EndpointModifier, QualifiedEdge, Relation};
pub use variant::{Coordinate, Fragment, FusionRange, Variant};
