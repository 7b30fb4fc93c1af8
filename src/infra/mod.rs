mod config;
mod types;

pub use config::{BotConfig, PlannerKind};
pub use types::{DIRECTIONS, Position};
