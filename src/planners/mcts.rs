use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::infra::BotConfig;
use crate::state::WorldSnapshot;

use super::actions::{enumerate_actions, sample_candidates};
use super::adjacency::AdjacencyIndex;
use super::evaluator::evaluate_state;
use super::executor::{ActionExecutor, ExecError};
use super::joint::{JointMove, compose_joint_moves};

/// Joint-move cap while rolling out; rollouts only need a coarse sample.
const ROLLOUT_JOINT_CAP: usize = 16;

/// Result margin that counts as a win or loss in the per-outcome tallies.
const OUTCOME_EPSILON: f32 = 1e-3;

/// One node of the search tree. Owns its snapshot clone; the parent is an
/// arena index used only to walk back up during backpropagation.
struct SearchNode {
    parent: Option<usize>,
    joint: Option<JointMove>,
    world: WorldSnapshot,
    untried: Vec<JointMove>,
    children: Vec<usize>,
    visits: u32,
    total_result: f32,
    wins: u32,
    losses: u32,
    draws: u32,
}

impl SearchNode {
    fn new(parent: Option<usize>, joint: Option<JointMove>, world: WorldSnapshot, untried: Vec<JointMove>) -> Self {
        Self {
            parent,
            joint,
            world,
            untried,
            children: Vec::new(),
            visits: 0,
            total_result: 0.0,
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }

    fn mean_result(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_result / self.visits as f32
        }
    }
}

/// Root-level bookkeeping from one search run.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Simulations that ran to completion before the deadline.
    pub simulations: usize,
    pub root_visits: u32,
    /// Visit count per root child, in creation order.
    pub root_child_visits: Vec<u32>,
    pub tree_size: usize,
}

/// UCT Monte Carlo Tree Search over joint-action transitions.
pub struct Mcts {
    pub simulations: usize,
    pub exploration: f32,
    pub rollout_depth: usize,
    pub deadline: Duration,
    pub candidate_cap: usize,
    pub joint_cap: usize,
    pub money_scale: f32,
}

impl Mcts {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            simulations: config.mcts_simulations,
            exploration: config.exploration,
            rollout_depth: config.rollout_depth,
            deadline: config.deadline,
            candidate_cap: config.candidate_cap,
            joint_cap: config.joint_cap,
            money_scale: config.money_scale,
        }
    }

    /// Run up to `simulations` select/expand/rollout/backpropagate passes
    /// from `world`, bounded by the shared deadline, and return the root
    /// child with the highest mean result (no exploration bonus).
    pub fn search<R: Rng>(
        &self,
        world: &WorldSnapshot,
        adjacency: &AdjacencyIndex,
        rng: &mut R,
    ) -> Result<Option<JointMove>, ExecError> {
        self.search_with_stats(world, adjacency, rng)
            .map(|(chosen, _)| chosen)
    }

    /// Like [`Mcts::search`], but also reports the root visit counts
    /// accumulated by the run.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn search_with_stats<R: Rng>(
        &self,
        world: &WorldSnapshot,
        adjacency: &AdjacencyIndex,
        rng: &mut R,
    ) -> Result<(Option<JointMove>, SearchStats), ExecError> {
        let root_moves = self.joint_moves(world, adjacency, self.joint_cap, rng);
        if root_moves.is_empty() {
            return Ok((None, SearchStats::default()));
        }

        let start = Instant::now();
        let mut nodes = vec![SearchNode::new(None, None, world.clone(), root_moves)];
        let mut simulations_run = 0usize;

        for _ in 0..self.simulations {
            if start.elapsed() >= self.deadline {
                break;
            }

            // Selection: descend while fully expanded and non-terminal.
            let mut index = 0usize;
            while nodes[index].untried.is_empty()
                && !nodes[index].children.is_empty()
                && !nodes[index].world.is_terminal()
            {
                index = self.select_uct_child(&nodes, index);
            }

            // Expansion: try one untried joint move from this node.
            if !nodes[index].world.is_terminal()
                && let Some(joint) = nodes[index].untried.pop()
            {
                let mut child_world = nodes[index].world.clone();
                ActionExecutor::apply_joint(&mut child_world, &joint)?;
                child_world.end_turn();
                let untried = if child_world.is_terminal() {
                    Vec::new()
                } else {
                    self.joint_moves(&child_world, adjacency, self.joint_cap, rng)
                };
                let child = SearchNode::new(Some(index), Some(joint), child_world, untried);
                nodes.push(child);
                let child_index = nodes.len() - 1;
                nodes[index].children.push(child_index);
                index = child_index;
            }

            // Rollout from the frontier node on a further clone.
            let result = self.rollout(&nodes[index].world, adjacency, start, rng)?;

            // Backpropagation along the parent chain, root included.
            let mut cursor = Some(index);
            while let Some(i) = cursor {
                let node = &mut nodes[i];
                node.visits += 1;
                node.total_result += result;
                if result > OUTCOME_EPSILON {
                    node.wins += 1;
                } else if result < -OUTCOME_EPSILON {
                    node.losses += 1;
                } else {
                    node.draws += 1;
                }
                cursor = node.parent;
            }
            simulations_run += 1;
        }

        let best = nodes[0]
            .children
            .iter()
            .copied()
            .filter(|&child| nodes[child].visits > 0)
            .max_by(|&a, &b| {
                nodes[a]
                    .mean_result()
                    .partial_cmp(&nodes[b].mean_result())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        tracing::debug!(
            simulations = simulations_run,
            tree_size = nodes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "MCTS finished"
        );
        if let Some(child) = best {
            let node = &nodes[child];
            tracing::debug!(
                visits = node.visits,
                mean = node.mean_result(),
                wins = node.wins,
                losses = node.losses,
                draws = node.draws,
                "Best root child"
            );
        }

        let stats = SearchStats {
            simulations: simulations_run,
            root_visits: nodes[0].visits,
            root_child_visits: nodes[0]
                .children
                .iter()
                .map(|&child| nodes[child].visits)
                .collect(),
            tree_size: nodes.len(),
        };

        let chosen = match best {
            Some(child) => nodes[child].joint,
            // Deadline hit before the first expansion: fall back to any
            // untried root move rather than returning nothing.
            None => nodes[0].untried.last().copied(),
        };
        Ok((chosen, stats))
    }

    fn select_uct_child(&self, nodes: &[SearchNode], parent: usize) -> usize {
        let parent_visits = nodes[parent].visits.max(1) as f32;
        let mut best = nodes[parent].children[0];
        let mut best_score = f32::NEG_INFINITY;
        for &child in &nodes[parent].children {
            let node = &nodes[child];
            let score = if node.visits == 0 {
                f32::INFINITY
            } else {
                node.mean_result()
                    + self.exploration
                        * (2.0 * parent_visits.ln() / node.visits as f32).sqrt()
            };
            if score > best_score {
                best_score = score;
                best = child;
            }
        }
        best
    }

    /// Random continuation up to the depth cutoff, preferring joint moves
    /// with a non-trivial interaction over pure movement.
    fn rollout<R: Rng>(
        &self,
        world: &WorldSnapshot,
        adjacency: &AdjacencyIndex,
        start: Instant,
        rng: &mut R,
    ) -> Result<f32, ExecError> {
        let mut sim = world.clone();
        for _ in 0..self.rollout_depth {
            if sim.is_terminal() || start.elapsed() >= self.deadline {
                break;
            }
            let moves = self.joint_moves(&sim, adjacency, ROLLOUT_JOINT_CAP, rng);
            if moves.is_empty() {
                break;
            }
            let interacting: Vec<JointMove> = moves
                .iter()
                .copied()
                .filter(JointMove::has_interaction)
                .collect();
            let pool = if interacting.is_empty() { &moves } else { &interacting };
            let Some(joint) = pool.choose(rng) else {
                break;
            };
            ActionExecutor::apply_joint(&mut sim, joint)?;
            sim.end_turn();
        }
        if sim.is_terminal() {
            Ok(sim.result())
        } else {
            Ok(evaluate_state(&sim, self.money_scale))
        }
    }

    fn joint_moves<R: Rng>(
        &self,
        world: &WorldSnapshot,
        adjacency: &AdjacencyIndex,
        cap: usize,
        rng: &mut R,
    ) -> Vec<JointMove> {
        let first = sample_candidates(
            enumerate_actions(world, 0, adjacency),
            self.candidate_cap,
            rng,
        );
        let second = sample_candidates(
            enumerate_actions(world, 1, adjacency),
            self.candidate_cap,
            rng,
        );
        let mut moves = compose_joint_moves(&first, &second, cap, rng);
        moves.shuffle(rng);
        moves
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn kitchen() -> WorldSnapshot {
        WorldSnapshot::parse(
            "#######\n\
             #1..2.#\n\
             #..S..#\n\
             #CBRKU#\n\
             #..$T.#\n\
             #######",
            500,
        )
    }

    fn planner(simulations: usize) -> Mcts {
        Mcts {
            simulations,
            exploration: 1.0,
            rollout_depth: 2,
            deadline: Duration::from_secs(600),
            candidate_cap: 8,
            joint_cap: 16,
            money_scale: 100.0,
        }
    }

    #[test]
    fn test_search_returns_a_move() {
        let world = kitchen();
        let adjacency = AdjacencyIndex::build(&world);
        let mut rng = StdRng::seed_from_u64(42);
        let chosen = planner(30).search(&world, &adjacency, &mut rng).unwrap();
        assert!(chosen.is_some());
    }

    #[test]
    fn test_root_visits_equal_simulation_count() {
        let world = kitchen();
        let adjacency = AdjacencyIndex::build(&world);
        let mut rng = StdRng::seed_from_u64(9);
        let (chosen, stats) = planner(25)
            .search_with_stats(&world, &adjacency, &mut rng)
            .unwrap();
        assert!(chosen.is_some());
        // The deadline is far away, so every budgeted simulation runs and
        // each one backpropagates through the root and exactly one child.
        assert_eq!(stats.simulations, 25);
        assert_eq!(stats.root_visits, 25);
        assert_eq!(stats.root_child_visits.iter().sum::<u32>(), 25);
        assert!(stats.tree_size > 1);
    }

    #[test]
    fn test_terminal_world_scores_by_money() {
        let mut world = kitchen();
        world.turn = world.turn_limit;
        world.team_money = 10;
        let adjacency = AdjacencyIndex::build(&world);
        let mcts = planner(5);
        let mut rng = StdRng::seed_from_u64(3);
        let result = mcts
            .rollout(&world, &adjacency, Instant::now(), &mut rng)
            .unwrap();
        assert_eq!(result, 1.0);
    }
}
