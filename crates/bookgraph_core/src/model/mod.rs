//! Domain model for reference-graph nodes.
//!
//! # Responsibility
//! - Define the admitted node record and the draft used while authoring.
//! - Define explicit edges drawn between admitted nodes.
//! - Own the schema rules deciding when a draft becomes a node.
//!
//! # Invariants
//! - Only `validation::validate` turns a `Draft` into a `NormalizedNode`.
//! - Admitted nodes are immutable under core operations.

pub mod draft;
pub mod edge;
pub mod node;
pub mod validation;
