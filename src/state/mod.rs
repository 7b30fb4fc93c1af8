mod item;
mod station;
mod world;

pub use item::{Food, FoodKind, Item, Pan, Plate, Purchase};
pub use station::{Station, StationKind, Tile};
pub use world::{AgentState, COOK_TURNS, Grid, Order, WASH_TURNS, WorldSnapshot};
