use std::env;
use std::time::Duration;

/// Which search strategy drives the per-turn decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerKind {
    FlatMonteCarlo,
    Mcts,
}

/// Planner tunables, loaded from the environment with sane defaults.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Wall-clock budget for one decision. Must fit comfortably inside the
    /// engine's per-turn allowance.
    pub deadline: Duration,
    /// Independent rollouts averaged per joint candidate (flat MC).
    pub rollouts_per_candidate: usize,
    /// Per-agent cap on enumerated candidates.
    pub candidate_cap: usize,
    /// Cap on composed joint moves.
    pub joint_cap: usize,
    /// Simulation budget for the MCTS planner.
    pub mcts_simulations: usize,
    /// UCT exploration constant.
    pub exploration: f32,
    /// Maximum random joint moves per MCTS rollout.
    pub rollout_depth: usize,
    /// Money differential that saturates the state evaluator.
    pub money_scale: f32,
    pub planner: PlannerKind,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            deadline: Duration::from_millis(100),
            rollouts_per_candidate: 3,
            candidate_cap: 40,
            joint_cap: 256,
            mcts_simulations: 400,
            exploration: 1.0,
            rollout_depth: 4,
            money_scale: 100.0,
            planner: PlannerKind::FlatMonteCarlo,
        }
    }
}

fn get_env_var_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|val| val.parse::<u64>().ok())
}

fn get_env_var_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|val| val.parse::<usize>().ok())
}

fn get_env_var_f32(key: &str) -> Option<f32> {
    env::var(key).ok().and_then(|val| val.parse::<f32>().ok())
}

impl BotConfig {
    /// Read overrides from `COOKBOT_*` environment variables (dotenv has
    /// already been loaded by the caller).
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = get_env_var_u64("COOKBOT_DEADLINE_MS") {
            config.deadline = Duration::from_millis(ms);
        }
        if let Some(n) = get_env_var_usize("COOKBOT_ROLLOUTS") {
            config.rollouts_per_candidate = n;
        }
        if let Some(n) = get_env_var_usize("COOKBOT_CANDIDATE_CAP") {
            config.candidate_cap = n;
        }
        if let Some(n) = get_env_var_usize("COOKBOT_JOINT_CAP") {
            config.joint_cap = n;
        }
        if let Some(n) = get_env_var_usize("COOKBOT_MCTS_SIMULATIONS") {
            config.mcts_simulations = n;
        }
        if let Some(c) = get_env_var_f32("COOKBOT_EXPLORATION") {
            config.exploration = c;
        }
        if let Some(n) = get_env_var_usize("COOKBOT_ROLLOUT_DEPTH") {
            config.rollout_depth = n;
        }
        if let Some(s) = get_env_var_f32("COOKBOT_MONEY_SCALE") {
            config.money_scale = s;
        }
        if let Ok(name) = env::var("COOKBOT_PLANNER") {
            match name.to_ascii_lowercase().as_str() {
                "mcts" => config.planner = PlannerKind::Mcts,
                "flat" | "flat_mc" => config.planner = PlannerKind::FlatMonteCarlo,
                other => tracing::warn!("Unknown COOKBOT_PLANNER value: {}", other),
            }
        }

        config
    }
}
