//! Synthetic inputs shared by the benchmarks.

use qg_core::{Goal, Language, ProgressState, ProofAction, ProofEnvInfo, ProofState};
use qg_tree::{EdgeInfo, SearchGraph, StateType};

pub fn state(i: usize) -> ProofState {
    ProofState::new(
        Language::Lean4,
        vec![Goal::with_hypotheses(
            format!("x{i} + 0 = x{i}"),
            [format!("h{i} : x{i} ∈ S")],
        )],
    )
}

pub fn tactic(i: usize) -> ProofAction {
    ProofAction::run_tactic(Language::Lean4, [format!("simp [h{i}]")])
}

/// `n` states in a chain, each with one extra failed self-loop.
pub fn chain_graph(n: usize) -> SearchGraph {
    let mut g = SearchGraph::new();
    for i in 0..n {
        let (a, b) = (state(i), state(i + 1));
        let ok = EdgeInfo::new(
            0.0,
            false,
            ProofEnvInfo::new(ProgressState::StateChanged),
            StateType::Discovered,
        )
        .with_q_value(1.0 / (i + 1) as f64);
        g.add(&a, &tactic(i), &b, ok);
        let failed = EdgeInfo::new(
            -0.1,
            false,
            ProofEnvInfo::failed("no progress"),
            StateType::Discovered,
        );
        g.add(&a, &ProofAction::run_tactic(Language::Lean4, ["ring"]), &a, failed);
    }
    g
}

/// A model-style tactic script mixing plain lines, brace blocks, calc chains and comments.
pub fn tactic_script(blocks: usize) -> String {
    let mut s = String::new();
    for i in 0..blocks {
        s.push_str(&format!("-- step {i}\nintro h{i}\n"));
        s.push_str(&format!("have h{i}' : x{i} = x{i} := by {{\n  simp\n}}\n"));
        s.push_str(&format!("calc x{i} = x{i} + 0 := by simp\n_ = x{i} := by ring,\n"));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_have_expected_shape() {
        let g = chain_graph(5);
        assert_eq!(g.state_count(), 6);
        assert_eq!(g.edge_count(), 10);
        assert_eq!(qg_agent::split_tactic_blocks(&[tactic_script(3)]).len(), 9);
    }
}
