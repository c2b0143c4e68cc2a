//! The guided tree-search policy.

use std::path::PathBuf;

use qg_core::{PolicyConfig, ProofAction, ProofState, ProofStats, Transition};
use qg_tree::{EdgeInfo, SearchGraph, StateType};
use tracing::{debug, info};

use crate::checkpoint::{fork_filename, read_checkpoint, write_checkpoint_atomic};
use crate::directive::SearchDirective;
use crate::policy::{Policy, PolicyError};
use crate::strategy::{ModelPrompter, SearchStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Open,
    Closed,
}

#[derive(Debug, Default, Clone)]
struct DecisionCounters {
    model_queries: u64,
    backtracks: u64,
    stops: u64,
    updates: u64,
}

/// Search-graph-backed policy.
///
/// Must be opened before use and closed afterwards:
///
/// - [`open`](Self::open) loads `<checkpoint_dir>/<checkpoint_filename>` if it exists,
///   otherwise starts an empty graph.
/// - [`close`](Self::close) writes the checkpoint when `checkpoint_on_exit` is set.
///
/// Deciding, recording or checkpointing while not open fails with
/// [`PolicyError::NotOpen`].
pub struct GuidedSearchPolicy<S, P> {
    checkpoint_dir: PathBuf,
    checkpoint_filename: String,
    checkpoint_on_exit: bool,
    strategy: S,
    prompter: P,
    graph: Option<SearchGraph>,
    phase: Phase,
    counters: DecisionCounters,
}

impl<S: SearchStrategy, P: ModelPrompter> GuidedSearchPolicy<S, P> {
    pub fn new(cfg: &PolicyConfig, prompter: P, strategy: S) -> Result<Self, PolicyError> {
        if cfg.checkpoint_dir.trim().is_empty() {
            return Err(PolicyError::InvalidConfig("checkpoint_dir must be non-empty"));
        }
        if cfg.checkpoint_filename.trim().is_empty() {
            return Err(PolicyError::InvalidConfig(
                "checkpoint_filename must be non-empty",
            ));
        }
        Ok(Self {
            checkpoint_dir: PathBuf::from(&cfg.checkpoint_dir),
            checkpoint_filename: cfg.checkpoint_filename.clone(),
            checkpoint_on_exit: cfg.checkpoint_on_exit,
            strategy,
            prompter,
            graph: None,
            phase: Phase::Created,
            counters: DecisionCounters::default(),
        })
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.checkpoint_dir.join(&self.checkpoint_filename)
    }

    pub fn checkpoint_filename(&self) -> &str {
        &self.checkpoint_filename
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    /// The live graph, once the policy has been opened.
    pub fn graph(&self) -> Option<&SearchGraph> {
        self.graph.as_ref()
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn open(&mut self) -> Result<(), PolicyError> {
        if self.phase == Phase::Open {
            return Err(PolicyError::AlreadyOpen);
        }
        // A policy reopened after close keeps its in-memory graph.
        if self.graph.is_none() {
            let path = self.checkpoint_path();
            let graph = match read_checkpoint(&path)? {
                Some(g) => {
                    info!(
                        path = %path.display(),
                        states = g.state_count(),
                        edges = g.edge_count(),
                        "loaded search graph checkpoint"
                    );
                    g
                }
                None => {
                    debug!(path = %path.display(), "no checkpoint, starting empty graph");
                    SearchGraph::new()
                }
            };
            self.graph = Some(graph);
        }
        self.phase = Phase::Open;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), PolicyError> {
        if self.phase != Phase::Open {
            return Err(PolicyError::NotOpen);
        }
        let res = if self.checkpoint_on_exit {
            self.write_checkpoint()
        } else {
            Ok(())
        };
        self.phase = Phase::Closed;
        res
    }

    /// Open, run `f`, and close even if `f` fails. A close error is only reported
    /// when `f` succeeded.
    pub fn scoped<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<PolicyError>,
    {
        self.open()?;
        let out = f(self);
        let closed = self.close();
        let v = out?;
        closed?;
        Ok(v)
    }

    fn open_graph(&self) -> Result<&SearchGraph, PolicyError> {
        match (self.phase, self.graph.as_ref()) {
            (Phase::Open, Some(g)) => Ok(g),
            _ => Err(PolicyError::NotOpen),
        }
    }

    /// Ask the strategy for a directive and turn it into an action.
    pub fn decide(&mut self, state: &ProofState) -> Result<ProofAction, PolicyError> {
        let graph = match (self.phase, self.graph.as_ref()) {
            (Phase::Open, Some(g)) => g,
            _ => return Err(PolicyError::NotOpen),
        };
        let directive = self.strategy.choose(graph, state);
        debug!(directive = directive.name(), "search directive");
        match directive {
            SearchDirective::NextActionPrompt(_)
            | SearchDirective::FailedActionPrompt(_)
            | SearchDirective::HarderStatePrompt(_)
            | SearchDirective::CyclicStatePrompt(_) => {
                self.counters.model_queries += 1;
                Ok(self.prompter.prompt(&directive)?)
            }
            SearchDirective::Backtrack => {
                self.counters.backtracks += 1;
                Ok(ProofAction::backtrack())
            }
            SearchDirective::Stop => {
                self.counters.stops += 1;
                Ok(ProofAction::exit())
            }
        }
    }

    /// Record a transition: insert the edge with an unset Q-value, notify the strategy,
    /// then replace the sentinel with the strategy's estimate.
    pub fn record(&mut self, t: &Transition) -> Result<(), PolicyError> {
        let info = EdgeInfo::new(t.reward, t.done, t.info.clone(), StateType::Discovered);
        let graph = match (self.phase, self.graph.as_mut()) {
            (Phase::Open, Some(g)) => g,
            _ => return Err(PolicyError::NotOpen),
        };
        graph.add(&t.state, &t.action, &t.next_state, info.clone());
        self.strategy.on_new_node(graph, t);
        let q = self.strategy.estimate_q_value(graph, t);
        graph.update_q_info(&t.state, &t.action, &t.next_state, info.with_q_value(q))?;
        self.counters.updates += 1;
        Ok(())
    }

    fn write_checkpoint(&self) -> Result<(), PolicyError> {
        let graph = self.open_graph()?;
        let path = self.checkpoint_path();
        write_checkpoint_atomic(&path, graph)?;
        info!(path = %path.display(), edges = graph.edge_count(), "checkpointed search graph");
        Ok(())
    }

    /// Independent copy of this policy starting from the current graph.
    ///
    /// The graph is written to a fresh `<stem>-<uuid>.<ext>` file next to the current
    /// checkpoint and the returned policy is bound to that file. It is not open yet; its
    /// `open` loads the fork, so the two policies never share a live graph.
    pub fn fork(&self) -> Result<GuidedSearchPolicy<S, P>, PolicyError>
    where
        S: Clone,
        P: Clone,
    {
        let graph = self.open_graph()?;
        let id = uuid::Uuid::new_v4().to_string();
        let filename = fork_filename(&self.checkpoint_filename, &id);
        let path = self.checkpoint_dir.join(&filename);
        write_checkpoint_atomic(&path, graph)?;
        info!(path = %path.display(), "forked search graph");
        Ok(GuidedSearchPolicy {
            checkpoint_dir: self.checkpoint_dir.clone(),
            checkpoint_filename: filename,
            checkpoint_on_exit: self.checkpoint_on_exit,
            strategy: self.strategy.clone(),
            prompter: self.prompter.clone(),
            graph: None,
            phase: Phase::Created,
            counters: DecisionCounters::default(),
        })
    }
}

impl<S: SearchStrategy, P: ModelPrompter> Policy for GuidedSearchPolicy<S, P> {
    fn next_action(&mut self, state: &ProofState) -> Result<ProofAction, PolicyError> {
        self.decide(state)
    }

    fn update(&mut self, transition: &Transition) -> Result<(), PolicyError> {
        self.record(transition)
    }

    fn checkpoint(&mut self) -> Result<(), PolicyError> {
        self.write_checkpoint()
    }

    fn efficiency_info(&self) -> ProofStats {
        let mut m = ProofStats::new();
        let (states, edges) = self
            .graph
            .as_ref()
            .map(|g| (g.state_count(), g.edge_count()))
            .unwrap_or((0, 0));
        m.insert("states".to_string(), states.into());
        m.insert("edges".to_string(), edges.into());
        m.insert("model_queries".to_string(), self.counters.model_queries.into());
        m.insert("backtracks".to_string(), self.counters.backtracks.into());
        m.insert("stops".to_string(), self.counters.stops.into());
        m.insert("updates".to_string(), self.counters.updates.into());
        m
    }
}
