//! Checkpoint document shape: one record per prior state.

use qg_core::{ProofAction, ProofState};
use serde::{Deserialize, Serialize};

use crate::edge::EdgeInfo;

/// All edges leaving `prev_state`, as parallel lists of equal length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub prev_state: ProofState,
    pub actions: Vec<ProofAction>,
    pub next_states: Vec<ProofState>,
    pub qinfos: Vec<EdgeInfo>,
}

impl NodeRecord {
    pub fn is_consistent(&self) -> bool {
        self.actions.len() == self.next_states.len() && self.actions.len() == self.qinfos.len()
    }
}
