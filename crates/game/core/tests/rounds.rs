use std::sync::{Arc, Mutex};

use chronicle_core::{
    EntityId, Player, SchedulerConfig, Tick, TimeOfNextAction, TurnEvent, TurnScheduler, World,
};

fn solo_player(time_in_round: u64) -> (World, EntityId, TurnScheduler, Arc<Mutex<Vec<TurnEvent>>>) {
    let mut world = World::new();
    let player = world
        .build()
        .with(Player)
        .with(TimeOfNextAction::new(Tick::ZERO))
        .id();

    let config = SchedulerConfig::new().with_time_in_round(Tick(time_in_round));
    let mut scheduler = TurnScheduler::new(config).unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    scheduler.subscribe(move |event: &TurnEvent| sink.lock().unwrap().push(event.clone()));

    assert_eq!(scheduler.next_turn(&world), Ok(player));
    events.lock().unwrap().clear();
    (world, player, scheduler, events)
}

fn rounds_ended(events: &[TurnEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|event| match event {
            TurnEvent::RoundEnded { round_count } => Some(*round_count),
            _ => None,
        })
        .collect()
}

#[test]
fn overflow_carries_remainder_into_next_round() {
    let (mut world, player, mut scheduler, events) = solo_player(100);

    scheduler.end_turn_and_advance(&mut world, Tick(95)).unwrap();
    assert_eq!(scheduler.round_time(), Tick(95));
    assert!(rounds_ended(&events.lock().unwrap()).is_empty());

    scheduler.end_turn_and_advance(&mut world, Tick(12)).unwrap();
    assert_eq!(scheduler.round_time(), Tick(7));
    assert_eq!(scheduler.round_count(), 1);
    assert_eq!(scheduler.total_time(), Tick(107));

    // Round end is announced before the holder change of the same step.
    let events = events.lock().unwrap();
    assert_eq!(
        events[events.len() - 2..],
        [
            TurnEvent::RoundEnded { round_count: 0 },
            TurnEvent::TurnHolderChanged {
                entity: player,
                is_player: true
            },
        ]
    );
}

#[test]
fn exactly_filling_a_round_rolls_over_once_to_zero() {
    let (mut world, _, mut scheduler, events) = solo_player(100);

    for spent in [30, 30, 40] {
        scheduler.end_turn_and_advance(&mut world, Tick(spent)).unwrap();
    }

    assert_eq!(rounds_ended(&events.lock().unwrap()), vec![0]);
    assert_eq!(scheduler.round_time(), Tick::ZERO);
    assert_eq!(scheduler.round_count(), 1);
    assert_eq!(scheduler.total_time(), Tick(100));
}

#[test]
fn zero_cost_turns_never_roll_over() {
    let (mut world, _, mut scheduler, events) = solo_player(10);

    for _ in 0..25 {
        scheduler.end_turn_and_advance(&mut world, Tick::ZERO).unwrap();
    }

    assert!(rounds_ended(&events.lock().unwrap()).is_empty());
    assert_eq!(scheduler.total_time(), Tick::ZERO);
}

#[test]
fn long_action_closes_every_round_it_spans() {
    let (mut world, _, mut scheduler, events) = solo_player(10);

    scheduler.end_turn_and_advance(&mut world, Tick(4)).unwrap();
    scheduler.end_turn_and_advance(&mut world, Tick(27)).unwrap();

    assert_eq!(rounds_ended(&events.lock().unwrap()), vec![0, 1, 2]);
    assert_eq!(scheduler.round_count(), 3);
    assert_eq!(scheduler.round_time(), Tick(1));
    assert_eq!(scheduler.total_time(), Tick(31));
}
