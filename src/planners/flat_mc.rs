use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::infra::BotConfig;
use crate::state::WorldSnapshot;

use super::evaluator::evaluate_state;
use super::executor::{ActionExecutor, ExecError};
use super::joint::JointMove;

// Epsilon for floating-point comparison when ranking candidates
const SCORE_COMPARISON_EPSILON: f32 = 0.001;

/// Flat time-budgeted Monte Carlo scorer over joint candidates.
///
/// Rollout depth is fixed at one simulated step: the external world has no
/// cheap undo and per-turn action allowances only replenish at a real turn
/// boundary, so deeper rollouts would break its legality assumptions.
pub struct FlatMonteCarlo {
    pub deadline: Duration,
    pub rollouts_per_candidate: usize,
    pub money_scale: f32,
}

impl FlatMonteCarlo {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            deadline: config.deadline,
            rollouts_per_candidate: config.rollouts_per_candidate.max(1),
            money_scale: config.money_scale,
        }
    }

    /// Score candidates in randomized order until the deadline hits and
    /// return the best one seen. Never returns `None` while at least one
    /// candidate exists; deadline exhaustion is the expected terminating
    /// condition, not an error.
    #[tracing::instrument(level = "debug", skip_all, fields(candidates = candidates.len()))]
    pub fn choose<R: Rng>(
        &self,
        world: &WorldSnapshot,
        mut candidates: Vec<JointMove>,
        rng: &mut R,
    ) -> Result<Option<JointMove>, ExecError> {
        if candidates.is_empty() {
            return Ok(None);
        }
        candidates.shuffle(rng);

        let start = Instant::now();
        let mut best = candidates[0];
        let mut best_score = f32::NEG_INFINITY;
        let mut scored = 0usize;

        'scan: for candidate in &candidates {
            if start.elapsed() >= self.deadline {
                break;
            }

            let mut total = 0.0;
            let mut completed = 0usize;
            for _ in 0..self.rollouts_per_candidate {
                if start.elapsed() >= self.deadline {
                    break 'scan;
                }
                let mut hypothesis = world.clone();
                ActionExecutor::apply_joint(&mut hypothesis, candidate)?;
                hypothesis.end_turn();
                total += evaluate_state(&hypothesis, self.money_scale);
                completed += 1;
            }
            if completed == 0 {
                break;
            }

            let score = total / completed as f32;
            scored += 1;
            if score > best_score + SCORE_COMPARISON_EPSILON {
                best_score = score;
                best = *candidate;
            }
        }

        tracing::debug!(
            scored = scored,
            best_score = best_score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Flat Monte Carlo scan finished"
        );
        Ok(Some(best))
    }
}
