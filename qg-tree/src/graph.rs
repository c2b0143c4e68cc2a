//! The search graph proper.

use qg_core::{ProofAction, ProofState};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::arena::{Arena, Edge, StateId};
use crate::edge::EdgeInfo;
use crate::record::NodeRecord;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("no such edge: {action} from state {prior}")]
    NoSuchEdge { prior: String, action: String },
    #[error("malformed checkpoint: {0}")]
    Malformed(String),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl TreeError {
    fn no_such_edge(prior: &ProofState, action: &ProofAction) -> Self {
        TreeError::NoSuchEdge {
            prior: qg_core::state_key(prior),
            action: format!("{:?}", action.kind),
        }
    }
}

/// Borrowed view of one edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'a> {
    pub prior: &'a ProofState,
    pub action: &'a ProofAction,
    pub next_state: &'a ProofState,
    pub info: &'a EdgeInfo,
}

#[derive(Debug, Clone, Default)]
pub struct SearchGraph {
    arena: Arena,
    // (prior, action) -> position in the prior's edge list.
    edge_index: FxHashMap<(StateId, ProofAction), usize>,
    // Prior states in order of their first outgoing edge.
    priors: Vec<StateId>,
    edge_count: usize,
}

impl SearchGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_count(&self) -> usize {
        self.arena.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    pub fn contains_state(&self, s: &ProofState) -> bool {
        self.arena.id_of(s).is_some()
    }

    fn id_of(&self, s: &ProofState) -> Option<StateId> {
        self.arena.id_of(s)
    }

    fn edge_ref<'a>(&'a self, prior: StateId, e: &'a Edge) -> EdgeRef<'a> {
        EdgeRef {
            prior: self.arena.state(prior),
            action: &e.action,
            next_state: self.arena.state(e.next),
            info: &e.info,
        }
    }

    /// Insert the edge `(prior, action) -> (next, info)`, replacing any edge already
    /// recorded for `(prior, action)`.
    pub fn add(
        &mut self,
        prior: &ProofState,
        action: &ProofAction,
        next: &ProofState,
        info: EdgeInfo,
    ) {
        let p = self.arena.intern(prior);
        let n = self.arena.intern(next);
        if let Some(&pos) = self.edge_index.get(&(p, action.clone())) {
            let e = &mut self.arena.edges_mut(p)[pos];
            e.action = action.clone();
            e.next = n;
            e.info = info;
            return;
        }
        let edges = self.arena.edges_mut(p);
        if edges.is_empty() {
            self.priors.push(p);
        }
        edges.push(Edge {
            action: action.clone(),
            next: n,
            info,
        });
        let pos = edges.len() - 1;
        self.edge_index.insert((p, action.clone()), pos);
        self.edge_count += 1;
    }

    /// Replace the info of an existing edge. Never creates an edge.
    pub fn update_q_info(
        &mut self,
        prior: &ProofState,
        action: &ProofAction,
        next: &ProofState,
        info: EdgeInfo,
    ) -> Result<(), TreeError> {
        let (p, n) = match (self.id_of(prior), self.id_of(next)) {
            (Some(p), Some(n)) => (p, n),
            _ => return Err(TreeError::no_such_edge(prior, action)),
        };
        let pos = match self.edge_index.get(&(p, action.clone())) {
            Some(&pos) => pos,
            None => return Err(TreeError::no_such_edge(prior, action)),
        };
        let e = &mut self.arena.edges_mut(p)[pos];
        if e.next != n {
            return Err(TreeError::no_such_edge(prior, action));
        }
        e.info = info;
        Ok(())
    }

    pub fn get(&self, prior: &ProofState, action: &ProofAction) -> Option<EdgeRef<'_>> {
        let p = self.id_of(prior)?;
        let &pos = self.edge_index.get(&(p, action.clone()))?;
        Some(self.edge_ref(p, &self.arena.edges(p)[pos]))
    }

    /// Edges leaving `prior`, in insertion order. Empty for unknown states.
    pub fn outgoing<'a>(&'a self, prior: &ProofState) -> impl Iterator<Item = EdgeRef<'a>> + 'a {
        let p = self.id_of(prior);
        p.into_iter().flat_map(move |p| {
            self.arena
                .edges(p)
                .iter()
                .map(move |e| self.edge_ref(p, e))
        })
    }

    /// Edges whose target is `state`.
    pub fn parents(&self, state: &ProofState) -> Vec<EdgeRef<'_>> {
        let Some(target) = self.id_of(state) else {
            return Vec::new();
        };
        self.edges().filter(|e| self.id_of(e.next_state) == Some(target)).collect()
    }

    /// Every edge, grouped by prior state.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.priors.iter().flat_map(move |&p| {
            self.arena
                .edges(p)
                .iter()
                .map(move |e| self.edge_ref(p, e))
        })
    }

    /// States with at least one outgoing edge, in order of their first edge.
    pub fn priors(&self) -> impl Iterator<Item = &ProofState> {
        self.priors.iter().map(move |&p| self.arena.state(p))
    }

    /// Prior states no other state points to. Self-loops (failed or no-op tactics)
    /// do not count as incoming edges.
    pub fn roots(&self) -> Vec<&ProofState> {
        let entered = self.arena.entered_from_elsewhere();
        self.priors
            .iter()
            .filter(|&&p| !entered[p as usize])
            .map(|&p| self.arena.state(p))
            .collect()
    }

    pub fn to_records(&self) -> Vec<NodeRecord> {
        self.priors
            .iter()
            .map(|&p| {
                let edges = self.arena.edges(p);
                NodeRecord {
                    prev_state: self.arena.state(p).clone(),
                    actions: edges.iter().map(|e| e.action.clone()).collect(),
                    next_states: edges
                        .iter()
                        .map(|e| self.arena.state(e.next).clone())
                        .collect(),
                    qinfos: edges.iter().map(|e| e.info.clone()).collect(),
                }
            })
            .collect()
    }

    pub fn from_records(records: Vec<NodeRecord>) -> Result<Self, TreeError> {
        let mut g = SearchGraph::new();
        for (i, r) in records.into_iter().enumerate() {
            if !r.is_consistent() {
                return Err(TreeError::Malformed(format!(
                    "record {i}: {} actions, {} next states, {} infos",
                    r.actions.len(),
                    r.next_states.len(),
                    r.qinfos.len()
                )));
            }
            for ((a, n), q) in r.actions.iter().zip(&r.next_states).zip(r.qinfos) {
                g.add(&r.prev_state, a, n, q);
            }
        }
        Ok(g)
    }

    /// Checkpoint text (JSON array of [`NodeRecord`]).
    pub fn serialize(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string(&self.to_records())?)
    }

    pub fn deserialize(data: &str) -> Result<Self, TreeError> {
        let records: Vec<NodeRecord> = serde_json::from_str(data)?;
        Self::from_records(records)
    }
}

impl PartialEq for SearchGraph {
    /// Same edge set: every `(prior, action)` resolves to the same next state and info.
    fn eq(&self, other: &Self) -> bool {
        self.edge_count == other.edge_count
            && self.edges().all(|e| {
                other.get(e.prior, e.action).is_some_and(|o| {
                    o.next_state == e.next_state
                        && o.info == e.info
                        && o.action.original_message == e.action.original_message
                })
            })
    }
}
