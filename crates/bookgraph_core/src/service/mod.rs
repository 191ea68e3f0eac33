//! Use-case services over the graph store.
//!
//! # Responsibility
//! - Authoring and selection workflows driven by UI commands.
//! - The workbench facade exposed to the presentation layer.
//!
//! # Invariants
//! - Services never bypass draft validation to admit nodes.

pub mod authoring;
pub mod selection;
pub mod workbench;
