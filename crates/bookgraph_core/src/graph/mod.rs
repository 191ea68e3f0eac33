//! Graph store and read-side queries.
//!
//! # Responsibility
//! - Keep the single source of truth for admitted nodes.
//!
//! # Invariants
//! - No edges are derived here; tags are flat metadata.

pub mod search;
pub mod store;
