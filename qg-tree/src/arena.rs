//! Interned state storage.
//!
//! Every distinct `ProofState` value owns exactly one node, addressed by a dense
//! [`StateId`]. Edges live under their prior state's node.

use qg_core::{ProofAction, ProofState};
use rustc_hash::FxHashMap;

use crate::edge::EdgeInfo;

pub type StateId = u32;

/// Outgoing edge stored under its prior state.
#[derive(Debug, Clone)]
pub struct Edge {
    pub action: ProofAction,
    pub next: StateId,
    pub info: EdgeInfo,
}

#[derive(Debug, Clone)]
struct StateNode {
    state: ProofState,
    edges: Vec<Edge>,
}

#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<StateNode>,
    ids: FxHashMap<ProofState, StateId>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of `state`, creating an edge-less node the first time the value is seen.
    pub fn intern(&mut self, state: &ProofState) -> StateId {
        if let Some(&id) = self.ids.get(state) {
            return id;
        }
        let id = self.nodes.len() as StateId;
        self.nodes.push(StateNode {
            state: state.clone(),
            edges: Vec::new(),
        });
        self.ids.insert(state.clone(), id);
        id
    }

    pub fn id_of(&self, state: &ProofState) -> Option<StateId> {
        self.ids.get(state).copied()
    }

    pub fn state(&self, id: StateId) -> &ProofState {
        &self.nodes[id as usize].state
    }

    pub fn edges(&self, id: StateId) -> &[Edge] {
        &self.nodes[id as usize].edges
    }

    pub fn edges_mut(&mut self, id: StateId) -> &mut Vec<Edge> {
        &mut self.nodes[id as usize].edges
    }

    /// Per state: whether some other state has an edge into it. Self-loops do not count.
    pub fn entered_from_elsewhere(&self) -> Vec<bool> {
        let mut entered = vec![false; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            for e in node.edges.iter().filter(|e| e.next as usize != id) {
                entered[e.next as usize] = true;
            }
        }
        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qg_core::{Goal, Language};

    fn st(goal: &str) -> ProofState {
        ProofState::new(Language::Lean, vec![Goal::new(goal)])
    }

    #[test]
    fn equal_states_share_one_id() {
        let mut a = Arena::new();
        let x = a.intern(&st("x"));
        let y = a.intern(&st("y"));
        assert_ne!(x, y);
        assert_eq!(a.intern(&st("x")), x);
        assert_eq!(a.len(), 2);
        assert_eq!(a.id_of(&st("y")), Some(y));
        assert_eq!(a.id_of(&st("z")), None);
        assert_eq!(a.state(y), &st("y"));
        assert!(a.edges(x).is_empty());
    }
}
