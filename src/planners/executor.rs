use thiserror::Error;

use crate::infra::Position;
use crate::state::{StationKind, WorldSnapshot};

use super::actions::{ActionCandidate, ActionKind};
use super::joint::JointMove;

/// Enumerator/executor contract breaches. Station kinds never change within
/// an episode, so neither of these can be a legitimate enumeration-time
/// race: they are programming errors, surfaced instead of skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("interaction {kind:?} targets {target:?}, which holds no station")]
    NoStationAt { kind: ActionKind, target: Position },
    #[error("interaction {kind:?} targets the {found:?} at {target:?}")]
    WrongStationKind {
        kind: ActionKind,
        target: Position,
        found: StationKind,
    },
}

/// Which station kinds each interaction command may legally target.
fn kind_allows(action: ActionKind, station: StationKind) -> bool {
    match action {
        ActionKind::Pickup => {
            matches!(station, StationKind::Counter | StationKind::IngredientBox)
        }
        ActionKind::Place => matches!(
            station,
            StationKind::Counter | StationKind::Cooker | StationKind::IngredientBox
        ),
        ActionKind::Chop => station == StationKind::Counter,
        ActionKind::StartCook | ActionKind::TakeFromPan => station == StationKind::Cooker,
        ActionKind::TakeCleanPlate => station == StationKind::PlateRack,
        ActionKind::PutDirtyPlate | ActionKind::WashSink => station == StationKind::Sink,
        ActionKind::FoodToPlate => station == StationKind::IngredientBox,
        ActionKind::Submit => station == StationKind::Submit,
        ActionKind::Buy(_) => station == StationKind::Shop,
        ActionKind::Trash => station == StationKind::Trash,
    }
}

/// Applies chosen actions to a snapshot, real or cloned.
///
/// Movement legality depends on concurrent occupancy, so every legality
/// check is re-run here against the snapshot being mutated rather than
/// trusted from enumeration time. A precondition that no longer holds skips
/// that sub-step and leaves the snapshot unchanged for it.
pub struct ActionExecutor;

impl ActionExecutor {
    pub fn apply(
        world: &mut WorldSnapshot,
        agent: usize,
        candidate: &ActionCandidate,
    ) -> Result<(), ExecError> {
        let (dx, dy) = world.agents[agent]
            .position
            .delta_to(&candidate.destination);
        if (dx, dy) != (0, 0) {
            if world.can_move(agent, dx, dy) {
                world.move_agent(agent, dx, dy);
            } else {
                tracing::trace!(
                    agent = agent,
                    destination = ?candidate.destination,
                    "Movement no longer legal, skipping"
                );
            }
        }

        let Some(interaction) = candidate.interaction else {
            return Ok(());
        };
        let target = interaction.target;
        let Some(station) = world.grid.station(&target) else {
            return Err(ExecError::NoStationAt {
                kind: interaction.kind,
                target,
            });
        };
        let found = station.kind();
        if !kind_allows(interaction.kind, found) {
            return Err(ExecError::WrongStationKind {
                kind: interaction.kind,
                target,
                found,
            });
        }

        let applied = match interaction.kind {
            ActionKind::Pickup => world.pickup(agent, &target),
            ActionKind::Place => world.place(agent, &target),
            ActionKind::Chop => world.chop(agent, &target),
            ActionKind::StartCook => world.start_cook(agent, &target),
            ActionKind::TakeFromPan => world.take_from_pan(agent, &target),
            ActionKind::TakeCleanPlate => world.take_clean_plate(agent, &target),
            ActionKind::PutDirtyPlate => world.put_dirty_plate(agent, &target),
            ActionKind::WashSink => world.wash_sink(agent, &target),
            ActionKind::FoodToPlate => world.add_food_to_plate(agent, &target),
            ActionKind::Submit => world.submit(agent, &target),
            ActionKind::Buy(purchase) => world.buy(agent, purchase, &target),
            ActionKind::Trash => world.trash(agent, &target),
        };
        if !applied {
            tracing::trace!(
                agent = agent,
                kind = ?interaction.kind,
                target = ?target,
                "Interaction precondition no longer holds, skipping"
            );
        }
        Ok(())
    }

    /// Apply both halves of a joint move, first agent first. The second
    /// agent's legality is judged against the state the first agent left
    /// behind.
    pub fn apply_joint(world: &mut WorldSnapshot, joint: &JointMove) -> Result<(), ExecError> {
        Self::apply(world, 0, &joint.first)?;
        Self::apply(world, 1, &joint.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planners::actions::{Interaction, MoveMode};
    use crate::state::{Food, FoodKind, Item, Order, Plate};

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

    #[test]
    fn test_move_then_submit_pays_the_order() {
        let mut world = kitchen();
        world.orders.push(Order::new(vec![FoodKind::Sauce], 75));
        world.agents[0].position = Position::new(4, 2);
        let mut plate = Plate::clean();
        plate.foods.push(Food::new(FoodKind::Sauce));
        world.agents[0].holding = Some(Item::Plate(plate));

        let candidate = ActionCandidate {
            destination: Position::new(5, 2),
            mode: MoveMode::MoveThenInteract,
            interaction: Some(Interaction {
                kind: ActionKind::Submit,
                target: Position::new(5, 3),
            }),
        };
        ActionExecutor::apply(&mut world, 0, &candidate).unwrap();
        assert_eq!(world.agents[0].position, Position::new(5, 2));
        assert_eq!(world.team_money, 75);
        assert!(world.orders.iter().all(|o| !o.is_active));
    }

    #[test]
    fn test_blocked_movement_skips_but_does_not_fail() {
        let mut world = kitchen();
        world.agents[1].position = Position::new(2, 1);
        let candidate = ActionCandidate {
            destination: Position::new(2, 1),
            mode: MoveMode::MoveOnly,
            interaction: None,
        };
        ActionExecutor::apply(&mut world, 0, &candidate).unwrap();
        assert_eq!(world.agents[0].position, Position::new(1, 1));
    }

    #[test]
    fn test_stale_interaction_skips_quietly() {
        let mut world = kitchen();
        world.agents[0].position = Position::new(2, 2);
        // Sink is empty: washing was enumerated against an older snapshot.
        let candidate = ActionCandidate {
            destination: Position::new(2, 2),
            mode: MoveMode::InteractInPlace,
            interaction: Some(Interaction {
                kind: ActionKind::WashSink,
                target: Position::new(3, 2),
            }),
        };
        assert!(ActionExecutor::apply(&mut world, 0, &candidate).is_ok());
    }

    #[test]
    fn test_wrong_station_kind_is_a_contract_error() {
        let mut world = kitchen();
        // Washing targets the counter at (1,3): kinds are fixed for the
        // map's lifetime, so this can only be an enumerator bug, never a
        // stale-snapshot race.
        world.agents[0].position = Position::new(2, 2);
        let candidate = ActionCandidate {
            destination: Position::new(2, 2),
            mode: MoveMode::InteractInPlace,
            interaction: Some(Interaction {
                kind: ActionKind::WashSink,
                target: Position::new(1, 3),
            }),
        };
        let err = ActionExecutor::apply(&mut world, 0, &candidate).unwrap_err();
        assert_eq!(
            err,
            ExecError::WrongStationKind {
                kind: ActionKind::WashSink,
                target: Position::new(1, 3),
                found: StationKind::Counter,
            }
        );
    }

    #[test]
    fn test_interaction_against_floor_is_a_contract_error() {
        let mut world = kitchen();
        let candidate = ActionCandidate {
            destination: Position::new(1, 1),
            mode: MoveMode::InteractInPlace,
            interaction: Some(Interaction {
                kind: ActionKind::Chop,
                target: Position::new(2, 2),
            }),
        };
        let err = ActionExecutor::apply(&mut world, 0, &candidate).unwrap_err();
        assert_eq!(
            err,
            ExecError::NoStationAt {
                kind: ActionKind::Chop,
                target: Position::new(2, 2),
            }
        );
    }
}
