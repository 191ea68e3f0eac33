//! Persistence port for admitted nodes.
//!
//! # Responsibility
//! - Define the seed/insert contract the workbench calls into.
//! - Keep SQL details behind the `NodeRepository` trait.
//!
//! # Invariants
//! - The graph store stays the source of truth; repositories only mirror it.

pub mod node_repo;
