use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::infra::{BotConfig, PlannerKind};
use crate::planners::{
    ActionExecutor, AdjacencyIndex, ExecError, FlatMonteCarlo, Mcts, compose_joint_moves,
    enumerate_actions, sample_candidates,
};
use crate::state::WorldSnapshot;

/// The decision engine: once per turn, choose and apply one joint action.
pub struct Bot {
    adjacency: AdjacencyIndex,
    config: BotConfig,
    rng: StdRng,
}

impl Bot {
    /// Build the adjacency index once from the static map. The map never
    /// changes within an episode, so the index is never rebuilt.
    pub fn new(world: &WorldSnapshot, config: BotConfig) -> Self {
        Self::with_seed(world, config, rand::random())
    }

    pub fn with_seed(world: &WorldSnapshot, config: BotConfig, seed: u64) -> Self {
        Self {
            adjacency: AdjacencyIndex::build(world),
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decide and apply one joint action for this turn. Invoked exactly
    /// once per real turn by the surrounding game loop.
    #[tracing::instrument(level = "debug", skip_all, fields(turn = world.turn))]
    pub fn play_turn(&mut self, world: &mut WorldSnapshot) -> Result<(), ExecError> {
        let turn_start = Instant::now();

        let first = sample_candidates(
            enumerate_actions(world, 0, &self.adjacency),
            self.config.candidate_cap,
            &mut self.rng,
        );
        let second = sample_candidates(
            enumerate_actions(world, 1, &self.adjacency),
            self.config.candidate_cap,
            &mut self.rng,
        );
        let joint = compose_joint_moves(&first, &second, self.config.joint_cap, &mut self.rng);
        debug!(
            agent0_candidates = first.len(),
            agent1_candidates = second.len(),
            joint_moves = joint.len(),
            "Enumerated turn options"
        );

        let chosen = match self.config.planner {
            PlannerKind::FlatMonteCarlo => {
                FlatMonteCarlo::from_config(&self.config).choose(world, joint, &mut self.rng)?
            }
            PlannerKind::Mcts => {
                Mcts::from_config(&self.config).search(world, &self.adjacency, &mut self.rng)?
            }
        };

        match chosen {
            Some(joint) => {
                ActionExecutor::apply_joint(world, &joint)?;
                info!(
                    first = ?joint.first,
                    second = ?joint.second,
                    "Applied joint action"
                );
            }
            None => {
                // No legal joint move at all: the turn is a no-op.
                debug!("No joint candidates, passing the turn");
            }
        }

        let elapsed = turn_start.elapsed();
        if elapsed > self.config.deadline {
            warn!(
                turn = world.turn,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.config.deadline.as_millis() as u64,
                "Turn decision ran over budget"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::state::{FoodKind, Order};

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

    fn fast_config(planner: PlannerKind) -> BotConfig {
        BotConfig {
            deadline: Duration::from_millis(20),
            mcts_simulations: 20,
            planner,
            ..BotConfig::default()
        }
    }

    #[test]
    fn test_play_turn_applies_a_legal_state_change() {
        let mut world = kitchen();
        world.team_money = 100;
        world.orders.push(Order::new(vec![FoodKind::Sauce], 60));
        let mut bot = Bot::with_seed(&world, fast_config(PlannerKind::FlatMonteCarlo), 17);
        bot.play_turn(&mut world).unwrap();
        // Agents never end up stacked on one cell.
        assert_ne!(world.agents[0].position, world.agents[1].position);
    }

    #[test]
    fn test_play_turn_with_mcts_planner() {
        let mut world = kitchen();
        world.team_money = 100;
        let mut bot = Bot::with_seed(&world, fast_config(PlannerKind::Mcts), 23);
        bot.play_turn(&mut world).unwrap();
        assert_ne!(world.agents[0].position, world.agents[1].position);
    }

    #[test]
    fn test_boxed_in_agents_pass_the_turn() {
        // Nothing to do and nowhere to go: both agents walled in, empty
        // stations everywhere.
        let mut world = WorldSnapshot::parse("####\n#12#\n####", 500);
        let mut bot = Bot::with_seed(&world, fast_config(PlannerKind::FlatMonteCarlo), 5);
        let before = world.agents.clone();
        bot.play_turn(&mut world).unwrap();
        assert_eq!(world.agents[0].position, before[0].position);
        assert_eq!(world.agents[1].position, before[1].position);
    }
}
