use super::item::{Food, Item, Pan};

/// Fieldless discriminant for [`Station`], used for adjacency dedup and
/// logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationKind {
    Counter,
    IngredientBox,
    Sink,
    PlateRack,
    Cooker,
    Trash,
    Shop,
    Submit,
}

/// A non-floor, non-wall cell with interaction semantics and its mutable
/// per-station state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Station {
    Counter {
        item: Option<Item>,
    },
    /// Ingredient-only storage. Stacks a single food kind.
    IngredientBox {
        food: Option<Food>,
        count: u32,
    },
    Sink {
        dirty_plates: u32,
        wash_progress: u32,
    },
    PlateRack {
        clean_plates: u32,
    },
    Cooker {
        pan: Option<Pan>,
        cook_progress: u32,
    },
    Trash,
    Shop,
    Submit,
}

impl Station {
    pub fn kind(&self) -> StationKind {
        match self {
            Station::Counter { .. } => StationKind::Counter,
            Station::IngredientBox { .. } => StationKind::IngredientBox,
            Station::Sink { .. } => StationKind::Sink,
            Station::PlateRack { .. } => StationKind::PlateRack,
            Station::Cooker { .. } => StationKind::Cooker,
            Station::Trash => StationKind::Trash,
            Station::Shop => StationKind::Shop,
            Station::Submit => StationKind::Submit,
        }
    }
}

/// One map cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Wall,
    Station(Station),
}

impl Tile {
    pub fn is_walkable(&self) -> bool {
        matches!(self, Tile::Floor)
    }

    pub fn station(&self) -> Option<&Station> {
        match self {
            Tile::Station(station) => Some(station),
            _ => None,
        }
    }
}
