/// Raw ingredient kinds sold by the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodKind {
    Egg,
    Onion,
    Meat,
    Noodles,
    Sauce,
}

impl FoodKind {
    pub const ALL: [FoodKind; 5] = [
        FoodKind::Egg,
        FoodKind::Onion,
        FoodKind::Meat,
        FoodKind::Noodles,
        FoodKind::Sauce,
    ];

    /// Whether this ingredient goes through the chopping step.
    pub fn can_chop(&self) -> bool {
        matches!(self, FoodKind::Onion | FoodKind::Meat)
    }

    /// Whether this ingredient goes through the cooker.
    pub fn can_cook(&self) -> bool {
        matches!(self, FoodKind::Egg | FoodKind::Meat | FoodKind::Noodles)
    }

    pub fn cost(&self) -> i64 {
        match self {
            FoodKind::Egg => 10,
            FoodKind::Onion => 10,
            FoodKind::Meat => 20,
            FoodKind::Noodles => 15,
            FoodKind::Sauce => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Food {
    pub kind: FoodKind,
    pub chopped: bool,
    pub cooked: bool,
}

impl Food {
    pub fn new(kind: FoodKind) -> Self {
        Self {
            kind,
            chopped: false,
            cooked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pan {
    pub food: Option<Food>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plate {
    pub dirty: bool,
    pub foods: Vec<Food>,
}

impl Plate {
    pub fn clean() -> Self {
        Self {
            dirty: false,
            foods: Vec::new(),
        }
    }
}

/// Anything an agent can hold. An agent holds at most one of these; placing
/// transfers ownership to the station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Food(Food),
    Pan(Pan),
    Plate(Plate),
}

/// One shop purchase option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purchase {
    Food(FoodKind),
    Pan,
    Plate,
}

impl Purchase {
    pub const ALL: [Purchase; 7] = [
        Purchase::Food(FoodKind::Egg),
        Purchase::Food(FoodKind::Onion),
        Purchase::Food(FoodKind::Meat),
        Purchase::Food(FoodKind::Noodles),
        Purchase::Food(FoodKind::Sauce),
        Purchase::Pan,
        Purchase::Plate,
    ];

    pub fn cost(&self) -> i64 {
        match self {
            Purchase::Food(kind) => kind.cost(),
            Purchase::Pan => 40,
            Purchase::Plate => 30,
        }
    }

    pub fn to_item(self) -> Item {
        match self {
            Purchase::Food(kind) => Item::Food(Food::new(kind)),
            Purchase::Pan => Item::Pan(Pan::default()),
            Purchase::Plate => Item::Plate(Plate::clean()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_covers_every_food_kind() {
        for kind in FoodKind::ALL {
            assert!(Purchase::ALL.contains(&Purchase::Food(kind)));
        }
    }

    #[test]
    fn test_purchased_plate_is_clean_and_empty() {
        let Item::Plate(plate) = Purchase::Plate.to_item() else {
            panic!("plate purchase must yield a plate");
        };
        assert!(!plate.dirty);
        assert!(plate.foods.is_empty());
    }
}
