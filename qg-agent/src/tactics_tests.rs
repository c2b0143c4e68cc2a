use crate::tactics::{split_tactic_blocks, TacticBlockParser};

#[test]
fn single_line_brace_block_is_one_unit() {
    assert_eq!(split_tactic_blocks(&["{ exact h1 }"]), vec!["{ exact h1 }"]);
}

#[test]
fn multi_line_brace_block_stays_together() {
    assert_eq!(
        split_tactic_blocks(&["{\nexact h1\n}"]),
        vec!["{\nexact h1\n}"]
    );
}

#[test]
fn nested_braces_close_when_balanced() {
    let units = split_tactic_blocks(&["{ have h : p := by {\nsimp }\nexact h }\nring"]);
    assert_eq!(units, vec!["{ have h : p := by {\nsimp }\nexact h }", "ring"]);
}

#[test]
fn calc_chain_spans_input_strings() {
    assert_eq!(
        split_tactic_blocks(&["calc a = b", "_ = c,"]),
        vec!["calc a = b\n_ = c,"]
    );
}

#[test]
fn calc_with_comma_on_first_line_closes_immediately() {
    assert_eq!(
        split_tactic_blocks(&["calc a = b := by simp,", "linarith"]),
        vec!["calc a = b := by simp,", "linarith"]
    );
}

#[test]
fn trailing_comment_unit_is_dropped() {
    assert_eq!(split_tactic_blocks(&["simp", "-- done"]), vec!["simp"]);
}

#[test]
fn comment_run_attaches_to_following_tactic() {
    assert_eq!(
        split_tactic_blocks(&["-- intro\nintro h", "exact h"]),
        vec!["-- intro\nintro h", "exact h"]
    );
}

#[test]
fn comment_run_closes_on_first_non_comment_line() {
    assert_eq!(
        split_tactic_blocks(&["-- note", "{", "simp", "}"]),
        vec!["-- note\n{", "simp", "}"]
    );
}

#[test]
fn brace_check_precedes_comment_check() {
    assert_eq!(
        split_tactic_blocks(&["-- use {h}", "exact h"]),
        vec!["-- use {h}", "exact h"]
    );
    // An unbalanced brace in a comment opens a brace block.
    assert_eq!(
        split_tactic_blocks(&["-- open {", "simp", "}", "ring"]),
        vec!["-- open {\nsimp\n}", "ring"]
    );
}

#[test]
fn calc_check_precedes_comment_check() {
    assert_eq!(
        split_tactic_blocks(&["-- calc first", "_ = c,", "ring"]),
        vec!["-- calc first\n_ = c,", "ring"]
    );
}

#[test]
fn blank_line_closes_comment_run() {
    assert_eq!(
        split_tactic_blocks(&["-- note\n-- more\n\nsimp"]),
        vec!["-- note\n-- more", "simp"]
    );
    assert_eq!(split_tactic_blocks(&["simp\n-- done\n"]), vec!["simp"]);
}

#[test]
fn lines_are_trimmed_and_blank_lines_skipped() {
    assert_eq!(
        split_tactic_blocks(&["  intro h  \n\n  simp at h\n"]),
        vec!["intro h", "simp at h"]
    );
}

#[test]
fn unterminated_block_is_force_closed() {
    let mut p = TacticBlockParser::new();
    p.push_text("{\nsimp");
    assert!(p.in_block());
    p.push_text("ring");
    assert_eq!(p.finish(), vec!["{\nsimp\nring"]);
}

#[test]
fn empty_input_yields_no_units() {
    let none: [&str; 0] = [];
    assert!(split_tactic_blocks(&none).is_empty());
    assert!(split_tactic_blocks(&["", "   "]).is_empty());
    assert!(split_tactic_blocks(&["-- only a comment"]).is_empty());
}
