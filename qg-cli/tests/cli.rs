use std::io::Write;
use std::process::{Command, Output, Stdio};

use qg_core::{Goal, Language, ProgressState, ProofAction, ProofEnvInfo, ProofState};
use qg_tree::{EdgeInfo, SearchGraph, StateType};

fn qg_bin() -> String {
    env!("CARGO_BIN_EXE_qg").to_string()
}

fn run(args: &[&str]) -> Output {
    Command::new(qg_bin()).args(args).output().unwrap()
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn sample_checkpoint(dir: &std::path::Path) -> std::path::PathBuf {
    let s0 = ProofState::new(Language::Lean4, vec![Goal::new("p → p")]);
    let s1 = ProofState::new(Language::Lean4, vec![Goal::with_hypotheses("p", ["h : p"])]);
    let done = ProofState::finished(Language::Lean4);

    let mut g = SearchGraph::new();
    let ok = ProofEnvInfo::new(ProgressState::StateChanged);
    g.add(
        &s0,
        &ProofAction::run_tactic(Language::Lean4, ["intro h"]),
        &s1,
        EdgeInfo::new(0.0, false, ok, StateType::Discovered).with_q_value(0.5),
    );
    g.add(
        &s0,
        &ProofAction::run_tactic(Language::Lean4, ["simp"]),
        &s0,
        EdgeInfo::new(
            0.0,
            false,
            ProofEnvInfo::failed("simp made no progress"),
            StateType::Discovered,
        ),
    );
    g.add(
        &s1,
        &ProofAction::run_tactic(Language::Lean4, ["exact h"]),
        &done,
        EdgeInfo::new(1.0, true, ProofEnvInfo::new(ProgressState::Done), StateType::Discovered)
            .with_q_value(1.0),
    );
    let path = dir.join("q_tree.json");
    std::fs::write(&path, g.serialize().unwrap()).unwrap();
    path
}

#[test]
fn help_runs() {
    let out = run(&["--help"]);
    assert!(out.status.success());
    let s = stdout(&out);
    assert!(s.contains("tree"));
    assert!(s.contains("tactics"));
}

#[test]
fn tree_stats_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample_checkpoint(dir.path());
    let out = run(&["tree", "stats", path.to_str().unwrap(), "--json"]);
    assert!(
        out.status.success(),
        "stderr:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
    let v: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(v["states"], 3);
    assert_eq!(v["edges"], 3);
    assert_eq!(v["roots"], 1);
    assert_eq!(v["failed_edges"], 1);
    assert_eq!(v["finished_edges"], 1);
    assert_eq!(v["best_q"], 1.0);
}

#[test]
fn tree_show_lists_edges() {
    let dir = tempfile::tempdir().unwrap();
    let path = sample_checkpoint(dir.path());
    let out = run(&["tree", "show", path.to_str().unwrap()]);
    assert!(out.status.success());
    let s = stdout(&out);
    assert_eq!(s.lines().count(), 3);
    assert!(s.contains("run_tactic[simp]"));
    assert!(s.contains("(failed)"));
    assert!(s.contains("(qed)"));
    // Unset Q-values print as -inf.
    assert!(s.contains("q=-inf"));

    let out = run(&["tree", "show", path.to_str().unwrap(), "--limit", "1"]);
    assert_eq!(stdout(&out).lines().count(), 1);
}

#[test]
fn tree_stats_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{not json").unwrap();
    let out = run(&["tree", "stats", path.to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid checkpoint"));
}

#[test]
fn tactics_split_from_file_and_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proof.lean");
    std::fs::write(&path, "intro h\n{\n  simp\n}\n-- trailing note\n").unwrap();

    let out = run(&["tactics", "split", path.to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(stdout(&out), "intro h\n\n{\nsimp\n}\n");

    let mut child = Command::new(qg_bin())
        .args(["tactics", "split", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"calc a = b\n_ = c,\nring")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_str(stdout(&out).trim()).unwrap();
    assert_eq!(v, serde_json::json!([["calc a = b\n_ = c,"], ["ring"]]));
}

#[test]
fn config_check_accepts_defaults_and_rejects_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.yaml");
    std::fs::write(&good, "agent:\n  name: minif2f\n").unwrap();
    let out = run(&["config", "check", good.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("minif2f"));

    let bad = dir.path().join("bad.yaml");
    std::fs::write(&bad, "policy:\n  checkpoint_filename: \"\"\n").unwrap();
    let out = run(&["config", "check", bad.to_str().unwrap()]);
    assert!(!out.status.success());
}

#[test]
fn global_config_sets_log_filter() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("qg.yaml");
    std::fs::write(&cfg, "logging:\n  filter: debug\n  events_path: /tmp/qg-events.ndjson\n")
        .unwrap();
    let tactics = dir.path().join("t.lean");
    std::fs::write(&tactics, "intro h\nsimp\n").unwrap();

    let out = Command::new(qg_bin())
        .args(["--config", cfg.to_str().unwrap(), "tactics", "split"])
        .arg(&tactics)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "intro h\n\nsimp\n");
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("split tactics"), "{err}");

    let out = run(&["config", "check", cfg.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("logging: filter=debug events=/tmp/qg-events.ndjson"));

    let missing = dir.path().join("missing.yaml");
    let out = run(&["--config", missing.to_str().unwrap(), "tactics", "split"]);
    assert!(!out.status.success());
}
