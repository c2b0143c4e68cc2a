//! Search graph mapping proof states to the actions tried from them.
//!
//! The graph knows nothing about proving. It stores, per prior state, at most one
//! edge per action together with the resulting state and an [`EdgeInfo`] carrying the
//! learning signal. States are keyed by value and may be reached along several paths,
//! so the structure is a general directed graph (cycles and multiple roots allowed).
//!
//! - Arena-backed state storage with a hashed value index
//! - Two-phase edge protocol: [`SearchGraph::add`] then [`SearchGraph::update_q_info`]
//! - Lossless checkpoint document grouped by prior state

pub mod arena;
pub mod edge;
pub mod graph;
pub mod record;

pub use arena::{Arena, StateId};
pub use edge::{EdgeInfo, StateType, Q_VALUE_UNSET};
pub use graph::{EdgeRef, SearchGraph, TreeError};
pub use record::NodeRecord;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
