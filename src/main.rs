use cookbot::state::{FoodKind, Order};
use cookbot::{Bot, BotConfig, WorldSnapshot};
use dotenv::dotenv;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEMO_KITCHEN: &str = "\
###########\n\
#1...$...2#\n\
#.C.....C.#\n\
#B.......B#\n\
#....S....#\n\
#....R....#\n\
#.K.....K.#\n\
#T...U...T#\n\
###########";

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cookbot=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let config = BotConfig::from_env();
    tracing::info!(?config, "Starting self-play demo");

    let mut world = WorldSnapshot::parse(DEMO_KITCHEN, 200);
    world.team_money = 120;
    world.orders.push(Order::new(vec![FoodKind::Sauce], 60));
    world.orders.push(Order::new(vec![FoodKind::Egg], 90));
    world
        .orders
        .push(Order::new(vec![FoodKind::Meat, FoodKind::Onion], 150));

    let mut bot = Bot::new(&world, config);

    while !world.is_terminal() {
        bot.play_turn(&mut world)?;
        world.end_turn();
    }

    let completed = world
        .orders
        .iter()
        .filter(|order| order.completed_turn.is_some())
        .count();
    tracing::info!(
        turns = world.turn,
        money = world.team_money,
        completed_orders = completed,
        "Demo finished"
    );

    Ok(())
}
