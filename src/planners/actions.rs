use rand::Rng;
use rand::seq::SliceRandom;

use crate::infra::{DIRECTIONS, Position};
use crate::state::{Item, Purchase, Station, WorldSnapshot};

use super::adjacency::AdjacencyIndex;

/// Interaction commands understood by the executor. One variant per command
/// of the world authority, so the dispatch match is exhaustive by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Pickup,
    Place,
    Chop,
    StartCook,
    TakeFromPan,
    TakeCleanPlate,
    PutDirtyPlate,
    WashSink,
    FoodToPlate,
    Submit,
    Buy(Purchase),
    Trash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMode {
    Stay,
    MoveOnly,
    InteractInPlace,
    MoveThenInteract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    pub kind: ActionKind,
    pub target: Position,
}

/// One candidate single-agent action. The destination is the cell the agent
/// occupies when the interaction (if any) fires, so mode and destination
/// stay consistent with whether movement happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCandidate {
    pub destination: Position,
    pub mode: MoveMode,
    pub interaction: Option<Interaction>,
}

impl ActionCandidate {
    pub fn stay(at: Position) -> Self {
        Self {
            destination: at,
            mode: MoveMode::Stay,
            interaction: None,
        }
    }

    /// Target cell of a non-trivial interaction, if any.
    pub fn interaction_target(&self) -> Option<Position> {
        self.interaction.map(|i| i.target)
    }
}

/// Enumerate every candidate action for one agent against the current
/// snapshot. Observed fresh each turn; nothing here is cached.
pub fn enumerate_actions(
    world: &WorldSnapshot,
    agent: usize,
    adjacency: &AdjacencyIndex,
) -> Vec<ActionCandidate> {
    let position = world.agents[agent].position;
    let holding = &world.agents[agent].holding;
    let mut candidates = vec![ActionCandidate::stay(position)];

    // Interaction origins: the current cell plus every cell one legal step
    // away.
    let mut origins = vec![(position, MoveMode::InteractInPlace)];
    for (dx, dy) in DIRECTIONS {
        if world.can_move(agent, dx, dy) {
            let destination = position.offset(dx, dy);
            candidates.push(ActionCandidate {
                destination,
                mode: MoveMode::MoveOnly,
                interaction: None,
            });
            origins.push((destination, MoveMode::MoveThenInteract));
        }
    }

    for (origin, mode) in origins {
        for (_, station_pos) in adjacency.stations_near(&origin) {
            let Some(station) = world.grid.station(station_pos) else {
                continue;
            };
            for kind in legal_interactions(world, holding, station) {
                candidates.push(ActionCandidate {
                    destination: origin,
                    mode,
                    interaction: Some(Interaction {
                        kind,
                        target: *station_pos,
                    }),
                });
            }
        }
    }

    tracing::trace!(
        agent = agent,
        total = candidates.len(),
        "Enumerated candidates"
    );
    candidates
}

/// The per-kind legality table: which interactions this station offers to an
/// agent holding `holding`, judging only station and held-item state (the
/// executor re-checks adjacency and occupancy at apply time).
fn legal_interactions(
    world: &WorldSnapshot,
    holding: &Option<Item>,
    station: &Station,
) -> Vec<ActionKind> {
    let mut kinds = Vec::new();
    match station {
        Station::Sink { dirty_plates, .. } => {
            if matches!(holding, Some(Item::Plate(plate)) if plate.dirty) {
                kinds.push(ActionKind::PutDirtyPlate);
            }
            if *dirty_plates >= 1 {
                kinds.push(ActionKind::WashSink);
            }
        }
        Station::PlateRack { clean_plates } => {
            if holding.is_none() && *clean_plates >= 1 {
                kinds.push(ActionKind::TakeCleanPlate);
            }
        }
        Station::Counter { item } => {
            if item.is_some() {
                kinds.push(ActionKind::Pickup);
            }
            if holding.is_none()
                && matches!(item, Some(Item::Food(food)) if food.kind.can_chop() && !food.chopped)
            {
                kinds.push(ActionKind::Chop);
            }
            if item.is_none() && holding.is_some() {
                kinds.push(ActionKind::Place);
            }
        }
        Station::Cooker { pan, .. } => {
            match pan {
                Some(pan_state) => {
                    if pan_state.food.is_some() && holding.is_none() {
                        kinds.push(ActionKind::TakeFromPan);
                    }
                    if pan_state.food.is_none()
                        && matches!(
                            holding,
                            Some(Item::Food(food)) if food.kind.can_cook() && !food.cooked
                        )
                    {
                        kinds.push(ActionKind::StartCook);
                    }
                }
                None => {
                    if matches!(holding, Some(Item::Pan(_))) {
                        kinds.push(ActionKind::Place);
                    }
                }
            }
        }
        Station::Trash => {
            let trashable = match holding {
                Some(Item::Food(_)) => true,
                Some(Item::Plate(plate)) => !plate.foods.is_empty(),
                Some(Item::Pan(pan)) => pan.food.is_some(),
                None => false,
            };
            if trashable {
                kinds.push(ActionKind::Trash);
            }
        }
        Station::Shop => {
            if holding.is_none() {
                for purchase in Purchase::ALL {
                    if world.team_money >= purchase.cost() {
                        kinds.push(ActionKind::Buy(purchase));
                    }
                }
            }
        }
        Station::IngredientBox { food, count } => {
            if *count > 0 && holding.is_none() {
                kinds.push(ActionKind::Pickup);
            }
            if *count > 0 && matches!(holding, Some(Item::Plate(_))) {
                kinds.push(ActionKind::FoodToPlate);
            }
            if let Some(held) = holding {
                let same_kind = matches!(
                    (held, food),
                    (Item::Food(h), Some(stored)) if h.kind == stored.kind
                );
                if *count == 0 || same_kind {
                    kinds.push(ActionKind::Place);
                }
            }
        }
        Station::Submit => {
            if matches!(
                holding,
                Some(Item::Plate(plate)) if !plate.dirty && !plate.foods.is_empty()
            ) {
                kinds.push(ActionKind::Submit);
            }
        }
    }
    kinds
}

/// Cap a candidate list for search: keep the stay candidate, uniformly
/// sample the rest. Trades completeness for bounded planning cost.
pub fn sample_candidates<R: Rng>(
    mut candidates: Vec<ActionCandidate>,
    cap: usize,
    rng: &mut R,
) -> Vec<ActionCandidate> {
    if candidates.len() <= cap || cap == 0 {
        return candidates;
    }
    let stay = candidates.remove(0);
    candidates.shuffle(rng);
    candidates.truncate(cap.saturating_sub(1));
    candidates.insert(0, stay);
    candidates
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::state::{Food, FoodKind, Order, Plate};

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

    fn dirty_plate() -> Item {
        Item::Plate(Plate {
            dirty: true,
            foods: Vec::new(),
        })
    }

    #[test]
    fn test_always_includes_stay() {
        let world = kitchen();
        let index = AdjacencyIndex::build(&world);
        let candidates = enumerate_actions(&world, 0, &index);
        assert_eq!(candidates[0], ActionCandidate::stay(world.agents[0].position));
    }

    #[test]
    fn test_dirty_plate_next_to_sink() {
        let mut world = kitchen();
        let index = AdjacencyIndex::build(&world);
        let sink = Position::new(3, 2);
        world.agents[0].position = Position::new(2, 2); // adjacent to sink
        world.agents[0].holding = Some(dirty_plate());

        let candidates = enumerate_actions(&world, 0, &index);
        assert!(candidates.iter().any(|c| {
            c.mode == MoveMode::InteractInPlace
                && c.interaction
                    == Some(Interaction {
                        kind: ActionKind::PutDirtyPlate,
                        target: sink,
                    })
        }));
        // Sink has no dirty plates yet: washing must not be offered.
        assert!(
            !candidates
                .iter()
                .any(|c| matches!(c.interaction, Some(i) if i.kind == ActionKind::WashSink))
        );

        // One step away instead: the same interaction arrives as
        // move-then-interact.
        world.agents[0].position = Position::new(1, 1);
        let candidates = enumerate_actions(&world, 0, &index);
        assert!(candidates.iter().any(|c| {
            c.mode == MoveMode::MoveThenInteract
                && c.destination == Position::new(2, 2)
                && c.interaction
                    == Some(Interaction {
                        kind: ActionKind::PutDirtyPlate,
                        target: sink,
                    })
        }));
    }

    #[test]
    fn test_wash_offered_once_sink_has_dirty_plates() {
        let mut world = kitchen();
        let sink = Position::new(3, 2);
        if let Some(Station::Sink { dirty_plates, .. }) = world.grid.station_mut(&sink) {
            *dirty_plates = 1;
        }
        let index = AdjacencyIndex::build(&world);
        world.agents[0].position = Position::new(2, 2);
        let candidates = enumerate_actions(&world, 0, &index);
        assert!(
            candidates
                .iter()
                .any(|c| matches!(c.interaction, Some(i) if i.kind == ActionKind::WashSink))
        );
    }

    #[test]
    fn test_plated_order_yields_single_submit_candidate_per_origin() {
        let mut world = kitchen();
        world.orders.push(Order::new(vec![FoodKind::Sauce], 60));
        let submit = Position::new(5, 3);
        world.agents[0].position = Position::new(5, 2);
        // Pin the other agent far away so it does not constrain movement.
        world.agents[1].position = Position::new(1, 1);
        let mut plate = Plate::clean();
        plate.foods.push(Food::new(FoodKind::Sauce));
        world.agents[0].holding = Some(Item::Plate(plate));

        let index = AdjacencyIndex::build(&world);
        let candidates = enumerate_actions(&world, 0, &index);
        let submits: Vec<_> = candidates
            .iter()
            .filter(|c| matches!(c.interaction, Some(i) if i.kind == ActionKind::Submit))
            .collect();
        assert!(!submits.is_empty());
        assert!(submits.iter().all(|c| c.interaction_target() == Some(submit)));
        let in_place: Vec<_> = submits
            .iter()
            .filter(|c| c.mode == MoveMode::InteractInPlace)
            .collect();
        assert_eq!(in_place.len(), 1);
    }

    #[test]
    fn test_buy_candidates_respect_funds() {
        let mut world = kitchen();
        world.agents[0].position = Position::new(2, 4);
        world.team_money = Purchase::Food(FoodKind::Sauce).cost();
        let index = AdjacencyIndex::build(&world);
        let candidates = enumerate_actions(&world, 0, &index);
        let buys: Vec<_> = candidates
            .iter()
            .filter_map(|c| match c.interaction {
                Some(Interaction {
                    kind: ActionKind::Buy(p),
                    ..
                }) => Some(p),
                _ => None,
            })
            .collect();
        assert!(buys.contains(&Purchase::Food(FoodKind::Sauce)));
        assert!(!buys.contains(&Purchase::Pan));
    }

    #[test]
    fn test_sampling_keeps_stay_and_respects_cap() {
        let world = kitchen();
        let index = AdjacencyIndex::build(&world);
        let candidates = enumerate_actions(&world, 0, &index);
        assert!(candidates.len() > 3);
        let mut rng = StdRng::seed_from_u64(7);
        let sampled = sample_candidates(candidates, 3, &mut rng);
        assert_eq!(sampled.len(), 3);
        assert_eq!(sampled[0].mode, MoveMode::Stay);
    }
}
