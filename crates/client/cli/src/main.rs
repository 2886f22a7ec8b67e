//! Headless demo of the turn scheduler.
//!
//! Spawns a player and a few AI actors with different action costs, runs a
//! fixed number of turns, and prints every bus event as a text or JSON line.
mod config;
mod logging;
mod output;

use anyhow::Result;
use chronicle_core::{Ai, EntityId, Name, Player, Tick, TimeOfNextAction, World};
use chronicle_runtime::{CostTableProvider, Event, FixedCostProvider, Runtime, Topic};
use tokio::sync::broadcast;

use config::{CliConfig, EventFormat};

const PLAYER_COST: Tick = Tick(25);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!(
        steps = config.steps,
        npcs = config.npcs,
        time_in_round = %config.time_in_round,
        format = %config.event_format,
        "starting chronicle demo"
    );

    let (world, npc_costs) = populate(config.npcs);

    let mut runtime = Runtime::builder()
        .config(config.runtime_config())
        .world(world)
        .player_provider(FixedCostProvider(PLAYER_COST))
        .npc_provider(npc_costs)
        .build()
        .await?;
    let handle = runtime.handle();

    let mut receivers =
        [Topic::Step, Topic::Round, Topic::Turn].map(|topic| handle.subscribe(topic));

    // Hand out the first turn up front so each step below prints exactly one
    // step line, then any round ends, then the hand-over.
    handle.next_turn().await?;
    print_pending(&mut receivers, config.event_format)?;

    for _ in 0..config.steps {
        runtime.step().await?;
        print_pending(&mut receivers, config.event_format)?;
    }

    let snapshot = handle.snapshot().await?;
    tracing::info!(
        total_time = %snapshot.total_time,
        rounds = snapshot.round_count,
        round_time = %snapshot.round_time,
        holder = ?snapshot.holder,
        "demo finished"
    );

    drop(handle);
    runtime.shutdown().await?;
    Ok(())
}

/// One player and `npcs` AI actors. AI actor `i` starts `i + 1` ticks in and
/// pays `20 + 15 * i` per action.
fn populate(npcs: usize) -> (World, CostTableProvider) {
    let mut world = World::new();
    world
        .build()
        .with(Name::new("hero"))
        .with(Player)
        .with(TimeOfNextAction::new(Tick::ZERO))
        .id();

    let mut costs = CostTableProvider::new(PLAYER_COST);
    for i in 0..npcs as u64 {
        let npc: EntityId = world
            .build()
            .with(Name::new(format!("npc-{i}")))
            .with(Ai)
            .with(TimeOfNextAction::new(Tick(i + 1)))
            .id();
        costs = costs.with_cost(npc, Tick(20 + 15 * i));
    }

    (world, costs)
}

fn print_pending(receivers: &mut [broadcast::Receiver<Event>], format: EventFormat) -> Result<()> {
    for rx in receivers.iter_mut() {
        loop {
            match rx.try_recv() {
                Ok(event) => println!("{}", output::render(&event, format)?),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event printer lagged behind");
                }
                Err(_) => break,
            }
        }
    }
    Ok(())
}
