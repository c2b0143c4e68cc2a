//! Segmentation of raw tactic text into atomic, replayable units.
//!
//! Lines are read across all input strings in order. A unit is a single line, or a
//! multi-line block that must not be split. Block openers are checked in this order:
//! - brace blocks: from a line containing `{` until the braces balance
//! - `calc` chains: from a line containing `calc` until a line containing `,`
//! - comment runs: lines starting with [`COMMENT_MARKER`]; the first line that does
//!   not start with the marker is appended and closes the run (a blank line closes it
//!   without being appended)
//!
//! A block still open when input runs out is closed as is. A trailing unit made only
//! of comment lines is dropped.

/// Line-comment marker of tactic scripts.
pub const COMMENT_MARKER: &str = "--";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Idle,
    Brace {
        depth: i64,
    },
    Comma,
    Comment,
}

/// Line-driven state machine behind [`split_tactic_blocks`].
#[derive(Debug, Default)]
pub struct TacticBlockParser {
    mode: Mode,
    block: Vec<String>,
    units: Vec<String>,
}

fn brace_delta(line: &str) -> i64 {
    let open = line.matches('{').count() as i64;
    let close = line.matches('}').count() as i64;
    open - close
}

fn is_comment_only(unit: &str) -> bool {
    unit.lines().all(|l| l.trim().starts_with(COMMENT_MARKER))
}

impl TacticBlockParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a brace, `calc` or comment block is accumulating.
    pub fn in_block(&self) -> bool {
        self.mode != Mode::Idle
    }

    /// Feed one tactic string (possibly several lines).
    pub fn push_text(&mut self, text: &str) {
        for line in text.split('\n') {
            self.push_line(line);
        }
    }

    pub fn push_line(&mut self, raw: &str) {
        let line = raw.trim();
        match self.mode {
            Mode::Idle => self.start(line),
            Mode::Brace { depth } => {
                self.block.push(line.to_string());
                let depth = depth + brace_delta(line);
                if depth == 0 {
                    self.emit();
                } else {
                    self.mode = Mode::Brace { depth };
                }
            }
            Mode::Comma => {
                self.block.push(line.to_string());
                if line.contains(',') {
                    self.emit();
                }
            }
            Mode::Comment => {
                if line.starts_with(COMMENT_MARKER) {
                    self.block.push(line.to_string());
                } else {
                    if !line.is_empty() {
                        self.block.push(line.to_string());
                    }
                    self.emit();
                }
            }
        }
    }

    fn start(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        self.block.push(line.to_string());
        if line.contains('{') {
            let depth = brace_delta(line);
            if depth == 0 {
                self.emit();
            } else {
                self.mode = Mode::Brace { depth };
            }
        } else if line.contains("calc") {
            if line.contains(',') {
                self.emit();
            } else {
                self.mode = Mode::Comma;
            }
        } else if line.starts_with(COMMENT_MARKER) {
            self.mode = Mode::Comment;
        } else {
            self.emit();
        }
    }

    fn emit(&mut self) {
        self.units.push(self.block.join("\n"));
        self.block.clear();
        self.mode = Mode::Idle;
    }

    /// Force-close any open block and return the units.
    pub fn finish(mut self) -> Vec<String> {
        if !self.block.is_empty() {
            self.emit();
        }
        if self.units.last().is_some_and(|u| is_comment_only(u)) {
            self.units.pop();
        }
        self.units
    }
}

/// Split tactic strings into atomic units, each run as one environment step.
pub fn split_tactic_blocks<S: AsRef<str>>(tactics: &[S]) -> Vec<String> {
    let mut p = TacticBlockParser::new();
    for t in tactics {
        p.push_text(t.as_ref());
    }
    p.finish()
}
