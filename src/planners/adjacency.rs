use std::collections::HashMap;

use crate::infra::Position;
use crate::state::{StationKind, Tile, WorldSnapshot};

/// Maps each floor cell to the stations reachable from it.
///
/// Built once from the static map before any planning and never mutated
/// afterwards; the enumerator borrows it every turn. Each floor cell keeps
/// at most one station per kind: when two same-kind stations touch the same
/// floor cell, the first one in row-major scan order wins and the second is
/// shadowed for that cell (it stays reachable from its other neighbors).
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    entries: HashMap<Position, Vec<(StationKind, Position)>>,
}

impl AdjacencyIndex {
    pub fn build(world: &WorldSnapshot) -> Self {
        let mut entries: HashMap<Position, Vec<(StationKind, Position)>> = HashMap::new();

        for station_pos in world.grid.positions() {
            let Some(Tile::Station(station)) = world.grid.get(&station_pos) else {
                continue;
            };
            let kind = station.kind();
            for floor_pos in station_pos.neighbors() {
                if !world.grid.is_walkable(&floor_pos) {
                    continue;
                }
                let list = entries.entry(floor_pos).or_default();
                if !list.iter().any(|(existing, _)| *existing == kind) {
                    list.push((kind, station_pos));
                }
            }
        }

        tracing::debug!(floor_cells = entries.len(), "Built adjacency index");
        Self { entries }
    }

    pub fn stations_near(&self, pos: &Position) -> &[(StationKind, Position)] {
        self.entries.get(pos).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
