use qg_core::{
    state_key, ActionKind, AgentConfig, ChatMessage, Config, EnvError, Language, ProofAction, ProofEnv,
    ProofState, ProofStats, Transition,
};
use qg_logging::{
    now_ms, EpisodeEventV1, NdjsonError, NdjsonWriter, StepEventV1, EVENT_SCHEMA_VERSION,
};
use qg_policy::{Policy, PolicyError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::tactics::split_tactic_blocks;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("policy: {0}")]
    Policy(#[from] PolicyError),
    #[error("environment: {0}")]
    Env(#[from] EnvError),
    #[error("event log: {0}")]
    Log(#[from] NdjsonError),
}

/// Outcome of one episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    /// Environment steps that were counted (failed fallbacks are not).
    pub steps: u32,
    pub total_reward: f64,
    /// The environment reported a terminal step.
    pub done: bool,
    pub proof_finished: bool,
}

#[derive(Debug, Default)]
struct Progress {
    steps: u32,
    total_reward: f64,
    done: bool,
}

/// Runs episodes of a [`ProofEnv`] driven by a [`Policy`].
pub struct ProofAgent<P: Policy> {
    name: String,
    policy: P,
    should_checkpoint: bool,
    proof_dump_file: Option<String>,
    fallback_tactic: String,
    events: Option<NdjsonWriter>,
    episode: u32,
    block_mode: bool,
}

/// Copy of `parent`'s message with its content replaced by a block-local tactic.
fn sub_message(parent: &ProofAction, tactic: &str) -> Option<ChatMessage> {
    parent.original_message.as_ref().map(|m| ChatMessage {
        role: m.role.clone(),
        content: format!("[RUN TACTIC]\n{tactic}\n[END]"),
    })
}

fn sub_action(parent: &ProofAction, language: Language, tactic: &str) -> ProofAction {
    let mut a = ProofAction::run_tactic(language, [tactic]);
    a.original_message = sub_message(parent, tactic);
    a
}

impl<P: Policy> ProofAgent<P> {
    pub fn new(name: impl Into<String>, policy: P) -> Self {
        Self {
            name: name.into(),
            policy,
            should_checkpoint: false,
            proof_dump_file: None,
            fallback_tactic: AgentConfig::default().fallback_tactic,
            events: None,
            episode: 0,
            block_mode: false,
        }
    }

    pub fn from_config(cfg: &AgentConfig, policy: P) -> Self {
        Self::new(cfg.name.clone(), policy)
            .with_checkpointing(cfg.should_checkpoint)
            .with_proof_dump_file(cfg.proof_dump_file.clone())
            .with_fallback_tactic(cfg.fallback_tactic.clone())
    }

    /// Agent settings from `cfg.agent`, plus the NDJSON event log at
    /// `cfg.logging.events_path` when one is configured.
    pub fn from_full_config(cfg: &Config, policy: P) -> Result<Self, AgentError> {
        let agent = Self::from_config(&cfg.agent, policy);
        Ok(match cfg.logging.events_path.as_deref() {
            Some(path) => {
                info!(path, "appending agent events");
                agent.with_event_log(NdjsonWriter::open_append(path)?)
            }
            None => agent,
        })
    }

    pub fn with_checkpointing(mut self, on: bool) -> Self {
        self.should_checkpoint = on;
        self
    }

    pub fn with_proof_dump_file(mut self, path: Option<String>) -> Self {
        self.proof_dump_file = path;
        self
    }

    pub fn with_fallback_tactic(mut self, tactic: impl Into<String>) -> Self {
        self.fallback_tactic = tactic.into();
        self
    }

    /// Write one NDJSON event per step and per episode.
    pub fn with_event_log(mut self, w: NdjsonWriter) -> Self {
        self.events = Some(w);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    pub fn into_policy(self) -> P {
        self.policy
    }

    /// Episodes started so far.
    pub fn episodes_run(&self) -> u32 {
        self.episode
    }

    /// One simple-protocol episode capped at `max_steps`.
    pub fn run_episode<E: ProofEnv>(
        &mut self,
        env: &mut E,
        max_steps: u32,
        render: bool,
    ) -> Result<EpisodeSummary, AgentError> {
        let mut stop = |steps: u32, _: &ProofStats| steps >= max_steps;
        let message = |steps: u32, _: &ProofStats| format!("Step {steps}/{max_steps}");
        self.simple_episode(env, render, &mut stop, &message)
    }

    /// One block-protocol episode capped at `max_steps`.
    pub fn run_block_episode<E: ProofEnv>(
        &mut self,
        env: &mut E,
        max_steps: u32,
        render: bool,
    ) -> Result<EpisodeSummary, AgentError> {
        let mut stop = |steps: u32, _: &ProofStats| steps >= max_steps;
        let message = |steps: u32, _: &ProofStats| format!("Step {steps}/{max_steps}");
        self.block_episode(env, render, &mut stop, &message)
    }

    pub fn run<E: ProofEnv>(
        &mut self,
        env: &mut E,
        episodes: u32,
        max_steps: u32,
        render: bool,
    ) -> Result<Vec<EpisodeSummary>, AgentError> {
        (0..episodes)
            .map(|_| self.run_episode(env, max_steps, render))
            .collect()
    }

    /// Simple-protocol episodes. `stop` sees the steps taken in the current episode and
    /// the policy's efficiency counters; `message` produces the per-iteration log line.
    pub fn run_episodes_till_stop<E, S, M>(
        &mut self,
        env: &mut E,
        episodes: u32,
        render: bool,
        mut stop: S,
        message: M,
    ) -> Result<Vec<EpisodeSummary>, AgentError>
    where
        E: ProofEnv,
        S: FnMut(u32, &ProofStats) -> bool,
        M: Fn(u32, &ProofStats) -> String,
    {
        (0..episodes)
            .map(|_| self.simple_episode(env, render, &mut stop, &message))
            .collect()
    }

    /// Block-protocol counterpart of [`Self::run_episodes_till_stop`].
    pub fn run_block_episodes_till_stop<E, S, M>(
        &mut self,
        env: &mut E,
        episodes: u32,
        render: bool,
        mut stop: S,
        message: M,
    ) -> Result<Vec<EpisodeSummary>, AgentError>
    where
        E: ProofEnv,
        S: FnMut(u32, &ProofStats) -> bool,
        M: Fn(u32, &ProofStats) -> String,
    {
        (0..episodes)
            .map(|_| self.block_episode(env, render, &mut stop, &message))
            .collect()
    }

    /// Run `cfg.episodes` episodes with the protocol `cfg.block_execution` selects.
    pub fn run_configured<E: ProofEnv>(
        &mut self,
        env: &mut E,
        cfg: &AgentConfig,
    ) -> Result<Vec<EpisodeSummary>, AgentError> {
        let max = cfg.max_steps_per_episode;
        let stop = move |steps: u32, _: &ProofStats| steps >= max;
        let message = move |steps: u32, _: &ProofStats| format!("Step {steps}/{max}");
        if cfg.block_execution {
            self.run_block_episodes_till_stop(env, cfg.episodes, cfg.render, stop, message)
        } else {
            self.run_episodes_till_stop(env, cfg.episodes, cfg.render, stop, message)
        }
    }

    fn simple_episode<E, S, M>(
        &mut self,
        env: &mut E,
        render: bool,
        stop: &mut S,
        message: &M,
    ) -> Result<EpisodeSummary, AgentError>
    where
        E: ProofEnv,
        S: FnMut(u32, &ProofStats) -> bool,
        M: Fn(u32, &ProofStats) -> String,
    {
        self.begin_episode(env, false)?;
        let mut prog = Progress::default();
        let mut state = env.state().clone();
        let mut stats = self.policy.efficiency_info();

        while !prog.done && !stop(prog.steps, &stats) {
            info!(agent = %self.name, "{}", message(prog.steps, &stats));
            debug!("asking policy for next action");
            let action = self.policy.next_action(&state)?;
            info!(action = ?action.kind, "got action");
            if action.is_exit() {
                warn!(agent = %self.name, "got EXIT action, exiting");
                break;
            }
            state = self.step_and_learn(env, &action, render, &mut prog)?;
            stats = self.policy.efficiency_info();
        }

        self.end_episode(env, &state, prog, &stats)
    }

    fn block_episode<E, S, M>(
        &mut self,
        env: &mut E,
        render: bool,
        stop: &mut S,
        message: &M,
    ) -> Result<EpisodeSummary, AgentError>
    where
        E: ProofEnv,
        S: FnMut(u32, &ProofStats) -> bool,
        M: Fn(u32, &ProofStats) -> String,
    {
        self.begin_episode(env, true)?;
        let mut prog = Progress::default();
        let mut state = env.state().clone();
        let mut stats = self.policy.efficiency_info();

        while !prog.done && !stop(prog.steps, &stats) {
            info!(agent = %self.name, "{}", message(prog.steps, &stats));
            debug!("asking policy for next action");
            let action = self.policy.next_action(&state)?;
            info!(action = ?action.kind, "got action");
            if action.is_exit() {
                warn!(agent = %self.name, "got EXIT action, exiting");
                break;
            }
            state = match &action.kind {
                ActionKind::RunTactic { language, tactics } => {
                    let language = *language;
                    let units = split_tactic_blocks(tactics);
                    debug!(units = units.len(), "split tactic block");
                    let mut s = state;
                    for unit in &units {
                        debug!(tactic = %unit, "running sub-action");
                        let t = self.step(env, &sub_action(&action, language, unit), render)?;
                        let failed = t.info.is_failed();
                        self.learn(&t, &mut prog, false)?;
                        s = t.next_state;
                        if failed || s.is_proof_finished() {
                            break;
                        }
                    }
                    if !s.is_proof_finished() && !prog.done {
                        s = self.fallback(env, &action, language, render, &mut prog)?;
                    }
                    s
                }
                _ => self.step_and_learn(env, &action, render, &mut prog)?,
            };
            stats = self.policy.efficiency_info();
        }

        self.end_episode(env, &state, prog, &stats)
    }

    fn begin_episode<E: ProofEnv>(
        &mut self,
        env: &mut E,
        block_mode: bool,
    ) -> Result<(), AgentError> {
        self.episode += 1;
        self.block_mode = block_mode;
        info!(agent = %self.name, episode = self.episode, block_mode, "episode start");
        env.reset()?;
        Ok(())
    }

    fn step<E: ProofEnv>(
        &mut self,
        env: &mut E,
        action: &ProofAction,
        render: bool,
    ) -> Result<Transition, AgentError> {
        let t = env.step(action)?;
        if render {
            env.render();
        }
        if let Some(msg) = &t.info.error_message {
            debug!(action = t.action.kind_name(), error = %msg, "step reported an error");
        }
        Ok(t)
    }

    /// Count the step and update the policy, except for applied backtracks.
    fn learn(
        &mut self,
        t: &Transition,
        prog: &mut Progress,
        fallback: bool,
    ) -> Result<(), AgentError> {
        let updated = !t.action.is_backtrack();
        if updated {
            debug!("updating policy");
            self.policy.update(t)?;
            debug!("policy updated");
        }
        prog.steps += 1;
        prog.total_reward += t.reward;
        prog.done = t.done;
        self.log_step(t, prog.steps, updated, fallback)
    }

    fn step_and_learn<E: ProofEnv>(
        &mut self,
        env: &mut E,
        action: &ProofAction,
        render: bool,
        prog: &mut Progress,
    ) -> Result<ProofState, AgentError> {
        let t = self.step(env, action, render)?;
        self.learn(&t, prog, false)?;
        Ok(t.next_state)
    }

    /// One catch-all attempt; only counted and learned from if it did not fail.
    fn fallback<E: ProofEnv>(
        &mut self,
        env: &mut E,
        parent: &ProofAction,
        language: Language,
        render: bool,
        prog: &mut Progress,
    ) -> Result<ProofState, AgentError> {
        let tactic = self.fallback_tactic.clone();
        let t = self.step(env, &sub_action(parent, language, &tactic), render)?;
        if t.info.is_failed() {
            debug!(tactic = %tactic, "fallback failed");
            prog.done = t.done;
            self.log_step(&t, prog.steps, false, true)?;
        } else {
            info!(tactic = %tactic, "fallback applied");
            self.learn(&t, prog, true)?;
        }
        Ok(t.next_state)
    }

    fn end_episode<E: ProofEnv>(
        &mut self,
        env: &mut E,
        state: &ProofState,
        prog: Progress,
        stats: &ProofStats,
    ) -> Result<EpisodeSummary, AgentError> {
        let summary = EpisodeSummary {
            steps: prog.steps,
            total_reward: prog.total_reward,
            done: prog.done,
            proof_finished: state.is_proof_finished(),
        };
        info!(
            agent = %self.name,
            episode = self.episode,
            steps = summary.steps,
            total_reward = summary.total_reward,
            proof_finished = summary.proof_finished,
            "episode end"
        );
        env.dump_proof(self.proof_dump_file.as_deref(), stats)?;
        if self.should_checkpoint {
            info!(agent = %self.name, "checkpointing policy");
            self.policy.checkpoint()?;
        }
        if let Some(w) = self.events.as_mut() {
            w.write_event(&EpisodeEventV1 {
                event: "episode",
                v: EVENT_SCHEMA_VERSION,
                ts_ms: now_ms(),
                agent: self.name.clone(),
                episode: self.episode,
                block_mode: self.block_mode,
                steps: summary.steps,
                total_reward: summary.total_reward,
                done: summary.done,
                proof_finished: summary.proof_finished,
            })?;
            w.flush()?;
        }
        Ok(summary)
    }

    fn log_step(
        &mut self,
        t: &Transition,
        step: u32,
        updated: bool,
        fallback: bool,
    ) -> Result<(), AgentError> {
        let Some(w) = self.events.as_mut() else {
            return Ok(());
        };
        w.write_event(&StepEventV1 {
            event: "step",
            v: EVENT_SCHEMA_VERSION,
            ts_ms: now_ms(),
            agent: self.name.clone(),
            episode: self.episode,
            step,
            action: t.action.kind_name(),
            state_key: state_key(&t.state),
            next_state_key: state_key(&t.next_state),
            reward: t.reward,
            done: t.done,
            progress: format!("{:?}", t.info.progress),
            policy_updated: updated,
            fallback,
        })?;
        Ok(())
    }
}
