mod actions;
mod adjacency;
mod evaluator;
mod executor;
mod flat_mc;
mod joint;
mod mcts;

pub use actions::{
    ActionCandidate, ActionKind, Interaction, MoveMode, enumerate_actions, sample_candidates,
};
pub use adjacency::AdjacencyIndex;
pub use evaluator::evaluate_state;
pub use executor::{ActionExecutor, ExecError};
pub use flat_mc::FlatMonteCarlo;
pub use joint::{JointMove, compose_joint_moves};
pub use mcts::{Mcts, SearchStats};
