use rand::Rng;
use rand::seq::SliceRandom;

use super::actions::ActionCandidate;

/// One action per agent for a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointMove {
    pub first: ActionCandidate,
    pub second: ActionCandidate,
}

impl JointMove {
    /// Whether either half carries a non-trivial interaction. Rollouts
    /// prefer these over pure shuffling.
    pub fn has_interaction(&self) -> bool {
        self.first.interaction.is_some() || self.second.interaction.is_some()
    }
}

/// Cross-combine the two agents' candidate lists under mutual exclusion:
/// never the same destination cell, never the same non-null interaction
/// target. Both lists are shuffled first so the cap cannot systematically
/// starve any action kind.
pub fn compose_joint_moves<R: Rng>(
    first: &[ActionCandidate],
    second: &[ActionCandidate],
    cap: usize,
    rng: &mut R,
) -> Vec<JointMove> {
    let mut first: Vec<ActionCandidate> = first.to_vec();
    let mut second: Vec<ActionCandidate> = second.to_vec();
    first.shuffle(rng);
    second.shuffle(rng);

    let mut joint = Vec::new();
    'outer: for a in &first {
        for b in &second {
            if a.destination == b.destination {
                continue;
            }
            if let (Some(ta), Some(tb)) = (a.interaction_target(), b.interaction_target())
                && ta == tb
            {
                continue;
            }
            joint.push(JointMove {
                first: *a,
                second: *b,
            });
            if joint.len() >= cap {
                break 'outer;
            }
        }
    }

    tracing::trace!(total = joint.len(), "Composed joint moves");
    joint
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::infra::Position;
    use crate::planners::actions::{ActionKind, Interaction, MoveMode};
    use crate::state::{FoodKind, Purchase};

    fn interact(destination: Position, kind: ActionKind, target: Position) -> ActionCandidate {
        ActionCandidate {
            destination,
            mode: MoveMode::InteractInPlace,
            interaction: Some(Interaction { kind, target }),
        }
    }

    #[test]
    fn test_no_shared_destination_or_target() {
        let shop = Position::new(3, 3);
        let a = vec![
            ActionCandidate::stay(Position::new(2, 3)),
            interact(Position::new(2, 3), ActionKind::Buy(Purchase::Pan), shop),
        ];
        let b = vec![
            ActionCandidate::stay(Position::new(2, 3)),
            interact(
                Position::new(4, 3),
                ActionKind::Buy(Purchase::Food(FoodKind::Egg)),
                shop,
            ),
        ];
        let mut rng = StdRng::seed_from_u64(11);
        let joint = compose_joint_moves(&a, &b, 64, &mut rng);
        assert!(!joint.is_empty());
        for m in &joint {
            assert_ne!(m.first.destination, m.second.destination);
            if let (Some(ta), Some(tb)) =
                (m.first.interaction_target(), m.second.interaction_target())
            {
                assert_ne!(ta, tb);
            }
        }
        // Both agents buying from the same shop tile is exactly the pair the
        // shared-target rule must exclude.
        assert!(!joint.iter().any(|m| {
            m.first.interaction_target() == Some(shop)
                && m.second.interaction_target() == Some(shop)
        }));
    }

    #[test]
    fn test_different_shop_tiles_allow_simultaneous_buys() {
        let shop_a = Position::new(3, 3);
        let shop_b = Position::new(5, 3);
        let a = vec![interact(
            Position::new(2, 3),
            ActionKind::Buy(Purchase::Pan),
            shop_a,
        )];
        let b = vec![interact(
            Position::new(4, 3),
            ActionKind::Buy(Purchase::Plate),
            shop_b,
        )];
        let mut rng = StdRng::seed_from_u64(11);
        let joint = compose_joint_moves(&a, &b, 64, &mut rng);
        assert_eq!(joint.len(), 1);
        assert!(joint[0].has_interaction());
    }

    #[test]
    fn test_cap_short_circuits() {
        let a: Vec<ActionCandidate> = (0..8)
            .map(|i| ActionCandidate::stay(Position::new(i, 0)))
            .collect();
        let b: Vec<ActionCandidate> = (0..8)
            .map(|i| ActionCandidate::stay(Position::new(i, 1)))
            .collect();
        let mut rng = StdRng::seed_from_u64(3);
        let joint = compose_joint_moves(&a, &b, 10, &mut rng);
        assert_eq!(joint.len(), 10);
    }
}
