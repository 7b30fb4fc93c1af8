use crate::state::WorldSnapshot;

/// Cheap heuristic over a snapshot: the money lead over the opposing team,
/// linearly scaled and clamped to [-1, 1]. `money_scale` is the lead that
/// saturates the score.
pub fn evaluate_state(world: &WorldSnapshot, money_scale: f32) -> f32 {
    let differential = (world.team_money - world.enemy_money) as f32;
    (differential / money_scale).clamp(-1.0, 1.0)
}
