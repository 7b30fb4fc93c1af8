pub mod game;
pub mod infra;
pub mod planners;
pub mod state;

// Re-export commonly used types for convenience
pub use game::Bot;
pub use infra::{BotConfig, PlannerKind, Position};
pub use planners::{ActionExecutor, AdjacencyIndex, ExecError, JointMove};
pub use state::WorldSnapshot;
