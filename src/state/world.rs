use std::collections::HashMap;

use tracing::warn;

use crate::infra::Position;

use super::item::{FoodKind, Item, Pan, Plate, Purchase};
use super::station::{Station, StationKind, Tile};

/// Turns of cooker progress before food in a pan is cooked.
pub const COOK_TURNS: u32 = 5;
/// Turns of washing before a dirty plate comes out clean.
pub const WASH_TURNS: u32 = 3;

/// Station grid keyed by coordinate.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    tiles: HashMap<Position, Tile>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            tiles: HashMap::new(),
        }
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn get(&self, pos: &Position) -> Option<&Tile> {
        self.tiles.get(pos)
    }

    pub fn insert(&mut self, pos: Position, tile: Tile) -> Option<Tile> {
        self.tiles.insert(pos, tile)
    }

    pub fn is_walkable(&self, pos: &Position) -> bool {
        self.in_bounds(pos) && self.get(pos).is_some_and(Tile::is_walkable)
    }

    pub fn station(&self, pos: &Position) -> Option<&Station> {
        self.get(pos).and_then(Tile::station)
    }

    pub fn station_mut(&mut self, pos: &Position) -> Option<&mut Station> {
        match self.tiles.get_mut(pos) {
            Some(Tile::Station(station)) => Some(station),
            _ => None,
        }
    }

    /// Deterministic row-major scan, independent of hash order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }
}

#[derive(Debug, Clone)]
pub struct AgentState {
    pub position: Position,
    pub holding: Option<Item>,
}

impl AgentState {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            holding: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub required: Vec<FoodKind>,
    pub reward: i64,
    pub is_active: bool,
    pub completed_turn: Option<u32>,
}

impl Order {
    pub fn new(required: Vec<FoodKind>, reward: i64) -> Self {
        Self {
            required,
            reward,
            is_active: true,
            completed_turn: None,
        }
    }
}

/// The full observable state needed to plan one turn.
///
/// The real game loop owns one of these; every planner hypothesis runs on an
/// independent `clone()` and never aliases the real state. All commands
/// re-check their own precondition and report whether they applied, so a
/// candidate enumerated against a stale snapshot can skip harmlessly.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub turn: u32,
    pub turn_limit: u32,
    pub grid: Grid,
    pub agents: [AgentState; 2],
    pub orders: Vec<Order>,
    pub team_money: i64,
    pub enemy_money: i64,
}

impl WorldSnapshot {
    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_terminal(&self) -> bool {
        self.turn >= self.turn_limit
    }

    /// Terminal win/loss/draw signal on team money.
    pub fn result(&self) -> f32 {
        if self.team_money > self.enemy_money {
            1.0
        } else if self.team_money < self.enemy_money {
            -1.0
        } else {
            0.0
        }
    }

    pub fn other_agent(&self, agent: usize) -> &AgentState {
        &self.agents[1 - agent]
    }

    /// Movement legality: one step in any of the eight directions onto a
    /// walkable cell not occupied by the other agent. Depends on concurrent
    /// occupancy, so it is re-checked against whichever snapshot is being
    /// mutated.
    pub fn can_move(&self, agent: usize, dx: i32, dy: i32) -> bool {
        if dx == 0 && dy == 0 {
            return false;
        }
        if dx.abs() > 1 || dy.abs() > 1 {
            return false;
        }
        let target = self.agents[agent].position.offset(dx, dy);
        self.grid.is_walkable(&target) && self.other_agent(agent).position != target
    }

    pub fn can_buy(&self, agent: usize, purchase: Purchase, target: &Position) -> bool {
        self.agents[agent].holding.is_none()
            && self.agents[agent].position.is_adjacent(target)
            && matches!(self.grid.station(target), Some(Station::Shop))
            && self.team_money >= purchase.cost()
    }

    pub fn can_start_cook(&self, agent: usize, target: &Position) -> bool {
        if !self.agents[agent].position.is_adjacent(target) {
            return false;
        }
        let holds_cookable = matches!(
            &self.agents[agent].holding,
            Some(Item::Food(food)) if food.kind.can_cook() && !food.cooked
        );
        holds_cookable
            && matches!(
                self.grid.station(target),
                Some(Station::Cooker { pan: Some(pan), .. }) if pan.food.is_none()
            )
    }

    pub fn can_submit(&self, agent: usize, target: &Position) -> bool {
        if !self.agents[agent].position.is_adjacent(target)
            || !matches!(self.grid.station(target), Some(Station::Submit))
        {
            return false;
        }
        let Some(Item::Plate(plate)) = &self.agents[agent].holding else {
            return false;
        };
        !plate.dirty
            && !plate.foods.is_empty()
            && self.orders.iter().any(|order| plate_fulfills(plate, order))
    }

    // ------------------------------------------------------------------
    // Commands. Each returns whether it applied; a failed precondition
    // leaves the snapshot unchanged.
    // ------------------------------------------------------------------

    pub fn move_agent(&mut self, agent: usize, dx: i32, dy: i32) -> bool {
        if !self.can_move(agent, dx, dy) {
            return false;
        }
        self.agents[agent].position = self.agents[agent].position.offset(dx, dy);
        true
    }

    /// Take the item from a counter or one ingredient from a box.
    pub fn pickup(&mut self, agent: usize, target: &Position) -> bool {
        if self.agents[agent].holding.is_some()
            || !self.agents[agent].position.is_adjacent(target)
        {
            return false;
        }
        match self.grid.station_mut(target) {
            Some(Station::Counter { item }) if item.is_some() => {
                self.agents[agent].holding = item.take();
                true
            }
            Some(Station::IngredientBox { food, count }) if *count > 0 => {
                let taken = food.clone();
                *count -= 1;
                if *count == 0 {
                    *food = None;
                }
                match taken {
                    Some(taken) => {
                        self.agents[agent].holding = Some(Item::Food(taken));
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// Put the held item on an empty counter, the held pan on an empty
    /// cooker, or stack held food in a box of the same kind.
    pub fn place(&mut self, agent: usize, target: &Position) -> bool {
        if self.agents[agent].holding.is_none()
            || !self.agents[agent].position.is_adjacent(target)
        {
            return false;
        }
        match self.grid.station_mut(target) {
            Some(Station::Counter { item }) if item.is_none() => {
                *item = self.agents[agent].holding.take();
                true
            }
            Some(Station::Cooker { pan, cook_progress }) if pan.is_none() => {
                if !matches!(&self.agents[agent].holding, Some(Item::Pan(_))) {
                    return false;
                }
                if let Some(Item::Pan(held)) = self.agents[agent].holding.take() {
                    *pan = Some(held);
                    *cook_progress = 0;
                }
                true
            }
            Some(Station::IngredientBox { food, count }) => {
                let Some(Item::Food(held)) = &self.agents[agent].holding else {
                    return false;
                };
                let matches_stack = match food {
                    None => *count == 0,
                    Some(stored) => stored.kind == held.kind,
                };
                if !matches_stack {
                    return false;
                }
                if let Some(Item::Food(held)) = self.agents[agent].holding.take() {
                    *count += 1;
                    *food = Some(held);
                }
                true
            }
            _ => false,
        }
    }

    /// Chop unchopped food sitting on a counter. Requires empty hands.
    pub fn chop(&mut self, agent: usize, target: &Position) -> bool {
        if self.agents[agent].holding.is_some()
            || !self.agents[agent].position.is_adjacent(target)
        {
            return false;
        }
        match self.grid.station_mut(target) {
            Some(Station::Counter {
                item: Some(Item::Food(food)),
            }) if food.kind.can_chop() && !food.chopped => {
                food.chopped = true;
                true
            }
            _ => false,
        }
    }

    pub fn start_cook(&mut self, agent: usize, target: &Position) -> bool {
        if !self.can_start_cook(agent, target) {
            return false;
        }
        let Some(Item::Food(food)) = self.agents[agent].holding.take() else {
            return false;
        };
        if let Some(Station::Cooker { pan: Some(pan), cook_progress }) =
            self.grid.station_mut(target)
        {
            pan.food = Some(food);
            *cook_progress = 0;
        }
        true
    }

    pub fn take_from_pan(&mut self, agent: usize, target: &Position) -> bool {
        if self.agents[agent].holding.is_some()
            || !self.agents[agent].position.is_adjacent(target)
        {
            return false;
        }
        match self.grid.station_mut(target) {
            Some(Station::Cooker { pan: Some(pan), cook_progress }) if pan.food.is_some() => {
                self.agents[agent].holding = pan.food.take().map(Item::Food);
                *cook_progress = 0;
                true
            }
            _ => false,
        }
    }

    pub fn take_clean_plate(&mut self, agent: usize, target: &Position) -> bool {
        if self.agents[agent].holding.is_some()
            || !self.agents[agent].position.is_adjacent(target)
        {
            return false;
        }
        match self.grid.station_mut(target) {
            Some(Station::PlateRack { clean_plates }) if *clean_plates > 0 => {
                *clean_plates -= 1;
                self.agents[agent].holding = Some(Item::Plate(Plate::clean()));
                true
            }
            _ => false,
        }
    }

    pub fn put_dirty_plate(&mut self, agent: usize, target: &Position) -> bool {
        if !self.agents[agent].position.is_adjacent(target) {
            return false;
        }
        let is_dirty_plate = matches!(
            &self.agents[agent].holding,
            Some(Item::Plate(plate)) if plate.dirty
        );
        if !is_dirty_plate {
            return false;
        }
        match self.grid.station_mut(target) {
            Some(Station::Sink { dirty_plates, .. }) => {
                *dirty_plates += 1;
                self.agents[agent].holding = None;
                true
            }
            _ => false,
        }
    }

    /// One turn of scrubbing. A finished plate lands on the first plate
    /// rack in row-major order.
    pub fn wash_sink(&mut self, agent: usize, target: &Position) -> bool {
        if !self.agents[agent].position.is_adjacent(target) {
            return false;
        }
        let finished = match self.grid.station_mut(target) {
            Some(Station::Sink { dirty_plates, wash_progress }) if *dirty_plates > 0 => {
                *wash_progress += 1;
                if *wash_progress >= WASH_TURNS {
                    *dirty_plates -= 1;
                    *wash_progress = 0;
                    true
                } else {
                    false
                }
            }
            _ => return false,
        };
        if finished {
            let rack = self
                .grid
                .positions()
                .find(|pos| matches!(self.grid.station(pos), Some(Station::PlateRack { .. })));
            match rack {
                Some(pos) => {
                    if let Some(Station::PlateRack { clean_plates }) = self.grid.station_mut(&pos)
                    {
                        *clean_plates += 1;
                    }
                }
                None => warn!("Washed a plate but the map has no plate rack"),
            }
        }
        true
    }

    /// Move one ingredient from a box onto the held clean plate.
    pub fn add_food_to_plate(&mut self, agent: usize, target: &Position) -> bool {
        if !self.agents[agent].position.is_adjacent(target) {
            return false;
        }
        let holds_clean_plate = matches!(
            &self.agents[agent].holding,
            Some(Item::Plate(plate)) if !plate.dirty
        );
        if !holds_clean_plate {
            return false;
        }
        let taken = match self.grid.station_mut(target) {
            Some(Station::IngredientBox { food, count }) if *count > 0 && food.is_some() => {
                let taken = food.clone();
                *count -= 1;
                if *count == 0 {
                    *food = None;
                }
                taken
            }
            _ => return false,
        };
        if let (Some(Item::Plate(plate)), Some(food)) =
            (&mut self.agents[agent].holding, taken)
        {
            plate.foods.push(food);
        }
        true
    }

    /// Hand a plated order to the submission point. Pays out the first
    /// matching active order and retires it.
    pub fn submit(&mut self, agent: usize, target: &Position) -> bool {
        if !self.can_submit(agent, target) {
            return false;
        }
        let Some(Item::Plate(plate)) = self.agents[agent].holding.take() else {
            return false;
        };
        let turn = self.turn;
        if let Some(order) = self
            .orders
            .iter_mut()
            .find(|order| plate_fulfills(&plate, order))
        {
            self.team_money += order.reward;
            order.is_active = false;
            order.completed_turn = Some(turn);
        }
        true
    }

    pub fn buy(&mut self, agent: usize, purchase: Purchase, target: &Position) -> bool {
        if !self.can_buy(agent, purchase, target) {
            return false;
        }
        self.team_money -= purchase.cost();
        self.agents[agent].holding = Some(purchase.to_item());
        true
    }

    /// Discard held food, empty a held plate, or empty a held pan.
    pub fn trash(&mut self, agent: usize, target: &Position) -> bool {
        if !self.agents[agent].position.is_adjacent(target)
            || !matches!(self.grid.station(target), Some(Station::Trash))
        {
            return false;
        }
        match &mut self.agents[agent].holding {
            Some(Item::Food(_)) => {
                self.agents[agent].holding = None;
                true
            }
            Some(Item::Plate(plate)) if !plate.foods.is_empty() => {
                plate.foods.clear();
                true
            }
            Some(Item::Pan(pan)) if pan.food.is_some() => {
                pan.food = None;
                true
            }
            _ => false,
        }
    }

    /// Advance the turn counter and tick passive station progress.
    pub fn end_turn(&mut self) {
        self.turn += 1;
        let cookers: Vec<Position> = self
            .grid
            .positions()
            .filter(|pos| matches!(self.grid.station(pos), Some(Station::Cooker { .. })))
            .collect();
        for pos in cookers {
            if let Some(Station::Cooker { pan: Some(pan), cook_progress }) =
                self.grid.station_mut(&pos)
                && let Some(food) = &mut pan.food
                && !food.cooked
            {
                *cook_progress += 1;
                if *cook_progress >= COOK_TURNS {
                    food.cooked = true;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Fixture construction
    // ------------------------------------------------------------------

    /// Build a snapshot from an ASCII kitchen. Legend: `.` floor, `#` wall,
    /// `C` counter, `B` ingredient box, `S` sink, `R` plate rack, `K`
    /// cooker (pan in place), `T` trash, `$` shop, `U` submission point,
    /// `1`/`2` agent start cells.
    pub fn parse(ascii: &str, turn_limit: u32) -> Self {
        let rows: Vec<&str> = ascii.lines().filter(|line| !line.is_empty()).collect();
        let height = rows.len() as i32;
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
        let mut grid = Grid::new(width, height);
        let mut starts = [Position::new(1, 1), Position::new(2, 1)];

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                let tile = match ch {
                    '.' => Tile::Floor,
                    '#' => Tile::Wall,
                    'C' => Tile::Station(Station::Counter { item: None }),
                    'B' => Tile::Station(Station::IngredientBox { food: None, count: 0 }),
                    'S' => Tile::Station(Station::Sink { dirty_plates: 0, wash_progress: 0 }),
                    'R' => Tile::Station(Station::PlateRack { clean_plates: 0 }),
                    'K' => Tile::Station(Station::Cooker {
                        pan: Some(Pan::default()),
                        cook_progress: 0,
                    }),
                    'T' => Tile::Station(Station::Trash),
                    '$' => Tile::Station(Station::Shop),
                    'U' => Tile::Station(Station::Submit),
                    '1' => {
                        starts[0] = pos;
                        Tile::Floor
                    }
                    '2' => {
                        starts[1] = pos;
                        Tile::Floor
                    }
                    other => {
                        warn!("Unknown map character {:?}, treating as wall", other);
                        Tile::Wall
                    }
                };
                grid.insert(pos, tile);
            }
        }

        Self {
            turn: 0,
            turn_limit,
            grid,
            agents: [AgentState::new(starts[0]), AgentState::new(starts[1])],
            orders: Vec::new(),
            team_money: 0,
            enemy_money: 0,
        }
    }
}

/// Whether a plate satisfies an order: every required kind is plated, and
/// anything cookable is cooked.
fn plate_fulfills(plate: &Plate, order: &Order) -> bool {
    order.is_active
        && order.completed_turn.is_none()
        && order.required.iter().all(|kind| {
            plate
                .foods
                .iter()
                .any(|food| food.kind == *kind && (!kind.can_cook() || food.cooked))
        })
}
