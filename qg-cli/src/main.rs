//! qg: CLI binary for qguide.
//!
//! Subcommands:
//! - tree stats / tree show: inspect a search-graph checkpoint
//! - tactics split: segment tactic text into atomic units
//! - config check: validate a YAML config
//!
//! `--config <yaml>` takes the log filter from `logging.filter`; otherwise only
//! warnings are logged (`RUST_LOG` overrides both).

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use qg_agent::split_tactic_blocks;
use qg_core::{state_key, ActionKind, Config};
use qg_tree::{EdgeRef, SearchGraph};
use tracing::debug;

/// qg: guided proof-search tooling.
#[derive(Parser)]
#[command(name = "qg", version, about)]
struct Cli {
    /// YAML config whose `logging.filter` sets the log level.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect a search-graph checkpoint.
    Tree {
        #[command(subcommand)]
        cmd: TreeCmd,
    },
    /// Tactic text utilities.
    Tactics {
        #[command(subcommand)]
        cmd: TacticsCmd,
    },
    /// Configuration utilities.
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum TreeCmd {
    /// Print state/edge counts of a checkpoint.
    Stats {
        checkpoint: PathBuf,
        /// Output as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
    /// Print edges of a checkpoint, one per line.
    Show {
        checkpoint: PathBuf,
        /// Print at most N edges.
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum TacticsCmd {
    /// Split tactic text into atomic units (reads stdin when no file is given).
    Split {
        file: Option<PathBuf>,
        /// Output a JSON list of one-element tactic lists.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Parse and validate a YAML config.
    Check { path: PathBuf },
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}

fn load_graph(path: &Path) -> SearchGraph {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Failed to read {}: {e}", path.display())));
    SearchGraph::deserialize(&text)
        .unwrap_or_else(|e| fail(format!("Invalid checkpoint {}: {e}", path.display())))
}

fn describe_action(e: &EdgeRef<'_>) -> String {
    match &e.action.kind {
        ActionKind::RunTactic { tactics, .. } => {
            format!("run_tactic[{}]", tactics.join("; ").replace('\n', "\\n"))
        }
        _ => e.action.kind_name().to_string(),
    }
}

fn cmd_tree_stats(path: &Path, json: bool) {
    let g = load_graph(path);
    let failed = g.edges().filter(|e| e.info.env_info.is_failed()).count();
    let finished = g
        .edges()
        .filter(|e| e.next_state.is_proof_finished())
        .count();
    let best_q = g
        .edges()
        .map(|e| e.info.q_value)
        .filter(|q| q.is_finite())
        .fold(None, |acc: Option<f64>, q| Some(acc.map_or(q, |a| a.max(q))));
    let roots = g.roots().len();

    if json {
        let v = serde_json::json!({
            "states": g.state_count(),
            "edges": g.edge_count(),
            "roots": roots,
            "failed_edges": failed,
            "finished_edges": finished,
            "best_q": best_q,
        });
        println!("{v}");
        return;
    }
    println!("Checkpoint: {}", path.display());
    println!("States:          {}", g.state_count());
    println!("Edges:           {}", g.edge_count());
    println!("Roots:           {roots}");
    println!("Failed edges:    {failed}");
    println!("Finished edges:  {finished}");
    match best_q {
        Some(q) => println!("Best Q-value:    {q:.4}"),
        None => println!("Best Q-value:    -"),
    }
}

fn cmd_tree_show(path: &Path, limit: Option<usize>) {
    let g = load_graph(path);
    let limit = limit.unwrap_or(usize::MAX);
    for e in g.edges().take(limit) {
        let status = if e.info.env_info.is_failed() {
            " (failed)"
        } else if e.next_state.is_proof_finished() {
            " (qed)"
        } else {
            ""
        };
        println!(
            "{} -> {}  {}  q={} reward={}{status}",
            state_key(e.prior),
            state_key(e.next_state),
            describe_action(&e),
            e.info.q_value,
            e.info.reward,
        );
    }
}

fn cmd_tactics_split(file: Option<&Path>, json: bool) {
    let text = match file {
        Some(p) => std::fs::read_to_string(p)
            .unwrap_or_else(|e| fail(format!("Failed to read {}: {e}", p.display()))),
        None => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .unwrap_or_else(|e| fail(format!("Failed to read stdin: {e}")));
            s
        }
    };
    let units = split_tactic_blocks(&[text]);
    debug!(units = units.len(), "split tactics");
    if json {
        let lists: Vec<[&str; 1]> = units.iter().map(|u| [u.as_str()]).collect();
        match serde_json::to_string(&lists) {
            Ok(s) => println!("{s}"),
            Err(e) => fail(e),
        }
        return;
    }
    println!("{}", units.join("\n\n"));
}

fn cmd_config_check(path: &Path) {
    match Config::load(path) {
        Ok(cfg) => {
            println!("OK: {}", path.display());
            println!(
                "checkpoint: {}",
                Path::new(&cfg.policy.checkpoint_dir)
                    .join(&cfg.policy.checkpoint_filename)
                    .display()
            );
            println!(
                "agent: {} ({} episode(s), {} steps max, block_execution={})",
                cfg.agent.name,
                cfg.agent.episodes,
                cfg.agent.max_steps_per_episode,
                cfg.agent.block_execution
            );
            println!(
                "logging: filter={} events={}",
                cfg.logging.filter,
                cfg.logging.events_path.as_deref().unwrap_or("-")
            );
        }
        Err(e) => fail(format!("Invalid config {}: {e}", path.display())),
    }
}

fn init_logging(config: Option<&Path>) {
    let filter = match config {
        Some(path) => Config::load(path)
            .unwrap_or_else(|e| fail(format!("Invalid config {}: {e}", path.display())))
            .logging
            .filter,
        None => "warn".to_string(),
    };
    qg_logging::init_tracing(&filter);
    debug!(filter = %filter, "logging initialized");
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.config.as_deref());
    match cli.command {
        Command::Tree { cmd } => match cmd {
            TreeCmd::Stats { checkpoint, json } => cmd_tree_stats(&checkpoint, json),
            TreeCmd::Show { checkpoint, limit } => cmd_tree_show(&checkpoint, limit),
        },
        Command::Tactics { cmd } => match cmd {
            TacticsCmd::Split { file, json } => cmd_tactics_split(file.as_deref(), json),
        },
        Command::Config { cmd } => match cmd {
            ConfigCmd::Check { path } => cmd_config_check(&path),
        },
    }
}
