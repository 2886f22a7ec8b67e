use std::sync::{Arc, Mutex};

use chronicle_core::{
    Ai, ComponentStore, ControlPhase, CoreError, EntityId, ErrorSeverity, Player, SchedulerConfig,
    StoreError, Tick, TimeOfNextAction, TurnError, TurnEvent, TurnPhase, TurnScheduler, World,
};

fn ai_only() -> SchedulerConfig {
    SchedulerConfig::new().with_require_player(false)
}

fn spawn_ai(world: &mut World, at: u64) -> EntityId {
    world
        .build()
        .with(Ai)
        .with(TimeOfNextAction::new(Tick(at)))
        .id()
}

fn spawn_player(world: &mut World, at: u64) -> EntityId {
    world
        .build()
        .with(Player)
        .with(TimeOfNextAction::new(Tick(at)))
        .id()
}

fn record(scheduler: &mut TurnScheduler) -> Arc<Mutex<Vec<TurnEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    scheduler.subscribe(move |event: &TurnEvent| sink.lock().unwrap().push(event.clone()));
    events
}

fn time_of(world: &World, entity: EntityId) -> Tick {
    world
        .get_component::<TimeOfNextAction>(entity)
        .unwrap()
        .tick()
}

#[test]
fn build_selects_earliest_and_end_turn_charges_holder() {
    let mut world = World::new();
    let a = spawn_ai(&mut world, 10);
    let b = spawn_ai(&mut world, 5);
    let c = spawn_ai(&mut world, 20);

    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
    let events = record(&mut scheduler);

    assert_eq!(scheduler.build_new_turn_queue(&world), Ok(b));
    assert_eq!(scheduler.turn_holder(), Some(b));
    assert_eq!(scheduler.phase(), TurnPhase::Active);
    assert_eq!(
        events.lock().unwrap().as_slice(),
        &[TurnEvent::TurnHolderChanged {
            entity: b,
            is_player: false
        }]
    );

    scheduler.end_turn(&mut world, Tick(8)).unwrap();
    assert_eq!(time_of(&world, b), Tick(13));
    assert_eq!(scheduler.queue().get(b), Some(Tick(13)));
    assert_eq!(scheduler.turn_holder(), None);
    assert_eq!(scheduler.phase(), TurnPhase::Resolving);

    assert_eq!(scheduler.time_of_last_turn(), Tick::ZERO);
    assert_eq!(scheduler.next_turn(&world), Ok(a));
    assert_eq!(scheduler.total_time(), Tick(10));
    assert_eq!(scheduler.time_of_last_turn(), scheduler.total_time());
    assert_eq!(scheduler.round_time(), Tick(10));

    // C stays queued behind A and B.
    assert_eq!(scheduler.queue().get(c), Some(Tick(20)));
}

#[test]
fn next_turn_bootstraps_an_empty_queue() {
    let mut world = World::new();
    let player = spawn_player(&mut world, 0);
    spawn_ai(&mut world, 5);

    let mut scheduler = TurnScheduler::new(SchedulerConfig::default()).unwrap();
    let events = record(&mut scheduler);

    assert_eq!(scheduler.next_turn(&world), Ok(player));
    assert_eq!(scheduler.queue().len(), 2);
    assert_eq!(scheduler.total_time(), Tick::ZERO);
    assert_eq!(scheduler.control(), Some(ControlPhase::PlayerTurn));
    assert_eq!(
        events.lock().unwrap().as_slice(),
        &[TurnEvent::TurnHolderChanged {
            entity: player,
            is_player: true
        }]
    );
}

#[test]
fn consecutive_enemy_turns_notify_once() {
    let mut world = World::new();
    let player = spawn_player(&mut world, 0);
    let goblin = spawn_ai(&mut world, 3);
    let orc = spawn_ai(&mut world, 4);

    let mut scheduler = TurnScheduler::new(SchedulerConfig::default()).unwrap();
    let events = record(&mut scheduler);

    scheduler.build_new_turn_queue(&world).unwrap();
    assert_eq!(scheduler.end_turn_and_advance(&mut world, Tick(10)), Ok(goblin));
    assert_eq!(scheduler.end_turn_and_advance(&mut world, Tick(10)), Ok(orc));
    assert_eq!(scheduler.control(), Some(ControlPhase::EnemyTurn));
    assert_eq!(scheduler.end_turn_and_advance(&mut world, Tick(10)), Ok(player));

    assert_eq!(
        events.lock().unwrap().as_slice(),
        &[
            TurnEvent::TurnHolderChanged {
                entity: player,
                is_player: true
            },
            TurnEvent::TurnHolderChanged {
                entity: goblin,
                is_player: false
            },
            TurnEvent::TurnHolderChanged {
                entity: player,
                is_player: true
            },
        ]
    );
}

#[test]
fn destroyed_entity_is_purged_not_selected() {
    let mut world = World::new();
    let a = spawn_ai(&mut world, 1);
    let b = spawn_ai(&mut world, 2);
    let c = spawn_ai(&mut world, 3);

    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
    scheduler.build_new_turn_queue(&world).unwrap();
    scheduler.end_turn(&mut world, Tick(10)).unwrap();

    assert!(world.despawn(b));

    assert_eq!(scheduler.next_turn(&world), Ok(c));
    assert!(!scheduler.queue().contains(b));
    assert!(scheduler.queue().contains(a));
}

#[test]
fn entity_losing_its_behaviour_is_purged() {
    let mut world = World::new();
    let a = spawn_ai(&mut world, 1);
    let b = spawn_ai(&mut world, 2);

    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
    scheduler.build_new_turn_queue(&world).unwrap();
    scheduler.end_turn(&mut world, Tick(10)).unwrap();

    world.remove_component::<Ai>(b);

    assert_eq!(scheduler.next_turn(&world), Ok(a));
    assert!(!scheduler.queue().contains(b));
}

#[test]
fn holder_destroyed_mid_turn_is_recoverable() {
    let mut world = World::new();
    let a = spawn_ai(&mut world, 1);
    let b = spawn_ai(&mut world, 2);

    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
    scheduler.build_new_turn_queue(&world).unwrap();
    world.despawn(a);

    assert_eq!(scheduler.end_turn(&mut world, Tick(5)), Ok(()));
    assert_eq!(scheduler.next_turn(&world), Ok(b));
}

#[test]
fn rebuild_after_holder_loss_picks_a_live_actor() {
    let mut world = World::new();
    let a = spawn_ai(&mut world, 1);
    let b = spawn_ai(&mut world, 2);

    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
    scheduler.build_new_turn_queue(&world).unwrap();
    world.despawn(a);

    assert_eq!(scheduler.rebuild_turn_queue(&world), Ok(b));
    assert_eq!(scheduler.queue().len(), 1);
}

#[test]
fn end_turn_without_holder_is_a_contract_violation() {
    let mut world = World::new();
    spawn_ai(&mut world, 1);

    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
    let err = scheduler.end_turn(&mut world, Tick(1)).unwrap_err();
    assert!(matches!(err, TurnError::NoTurnHolder { .. }));
    assert_eq!(err.severity(), ErrorSeverity::Internal);

    scheduler.build_new_turn_queue(&world).unwrap();
    scheduler.end_turn(&mut world, Tick(1)).unwrap();
    assert!(matches!(
        scheduler.end_turn(&mut world, Tick(1)),
        Err(TurnError::NoTurnHolder { .. })
    ));
}

#[test]
fn empty_store_is_fatal() {
    let world = World::new();
    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();

    let err = scheduler.build_new_turn_queue(&world).unwrap_err();
    assert!(matches!(err, TurnError::EmptySchedule { .. }));
    assert_eq!(err.severity(), ErrorSeverity::Fatal);
    assert_eq!(err.error_code(), "TURN_EMPTY_SCHEDULE");

    assert!(matches!(
        scheduler.next_turn(&world),
        Err(TurnError::EmptySchedule { .. })
    ));
    assert_eq!(scheduler.phase(), TurnPhase::Uninitialised);
}

#[test]
fn player_marker_must_be_unique() {
    let mut world = World::new();
    spawn_player(&mut world, 0);
    spawn_player(&mut world, 1);

    let mut scheduler = TurnScheduler::new(SchedulerConfig::default()).unwrap();
    let err = scheduler.build_new_turn_queue(&world).unwrap_err();
    assert!(matches!(
        err,
        TurnError::Store(StoreError::MultipleMarkersFound { .. })
    ));
    assert_eq!(err.severity(), ErrorSeverity::Fatal);
    assert_eq!(scheduler.turn_holder(), None);
}

#[test]
fn missing_player_is_fatal_when_required() {
    let mut world = World::new();
    spawn_ai(&mut world, 0);

    let mut scheduler = TurnScheduler::new(SchedulerConfig::default()).unwrap();
    assert!(matches!(
        scheduler.next_turn(&world),
        Err(TurnError::Store(StoreError::MarkerNotFound { marker: "Player" }))
    ));
}

#[test]
fn negative_progression_is_fatal_and_leaves_state_untouched() {
    let mut world = World::new();
    let a = spawn_ai(&mut world, 10);
    let b = spawn_ai(&mut world, 20);

    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
    assert_eq!(scheduler.next_turn(&world), Ok(a));
    scheduler.end_turn(&mut world, Tick(5)).unwrap();

    // Rewound out of band, behind the clock.
    world.get_component_mut::<TimeOfNextAction>(b).unwrap().0 = Tick(3);
    assert_eq!(scheduler.build_new_turn_queue(&world), Ok(b));

    let events = record(&mut scheduler);
    let before = scheduler.snapshot();

    let err = scheduler.next_turn(&world).unwrap_err();
    assert!(matches!(
        err,
        TurnError::NegativeTimeProgression {
            ready_at: Tick(3),
            time_of_last_turn: Tick(10),
            ..
        }
    ));
    assert_eq!(err.severity(), ErrorSeverity::Fatal);
    assert_eq!(scheduler.snapshot(), before);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn schedule_adds_newcomers_and_rejects_inert_entities() {
    let mut world = World::new();
    let a = spawn_ai(&mut world, 0);

    let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
    assert_eq!(scheduler.next_turn(&world), Ok(a));
    scheduler.end_turn(&mut world, Tick(10)).unwrap();

    let newcomer = spawn_ai(&mut world, 4);
    assert_eq!(scheduler.schedule(&world, newcomer), Ok(Tick(4)));
    assert_eq!(scheduler.next_turn(&world), Ok(newcomer));

    let crate_entity = world.build().with(TimeOfNextAction::new(Tick(50))).id();
    assert!(matches!(
        scheduler.schedule(&world, crate_entity),
        Err(TurnError::NotSchedulable { .. })
    ));
}

#[test]
fn schedule_rejects_a_second_player() {
    let mut world = World::new();
    let hero = spawn_player(&mut world, 0);

    let mut scheduler = TurnScheduler::new(SchedulerConfig::new()).unwrap();
    assert_eq!(scheduler.next_turn(&world), Ok(hero));

    let impostor = spawn_player(&mut world, 5);
    let err = scheduler.schedule(&world, impostor).unwrap_err();
    assert!(matches!(
        err,
        TurnError::Store(StoreError::MultipleMarkersFound { ref holders, .. })
            if holders == &vec![hero, impostor]
    ));
    assert!(!scheduler.queue().contains(impostor));
}

#[test]
fn ties_resolve_to_lowest_entity_id() {
    let mut world = World::new();
    let first = spawn_ai(&mut world, 5);
    let second = spawn_ai(&mut world, 5);

    for _ in 0..5 {
        let mut scheduler = TurnScheduler::new(ai_only()).unwrap();
        assert_eq!(scheduler.build_new_turn_queue(&world), Ok(first));
        assert_eq!(scheduler.queue().peek_min(), Some((first, Tick(5))));
    }
    assert!(first < second);
}

#[test]
fn clock_is_monotonic_and_single_holder_holds() {
    let mut world = World::new();
    let player = spawn_player(&mut world, 0);
    let speeds = [(spawn_ai(&mut world, 2), 7u64), (spawn_ai(&mut world, 4), 13)];

    let mut scheduler = TurnScheduler::new(SchedulerConfig::default()).unwrap();
    scheduler.build_new_turn_queue(&world).unwrap();

    let mut last_total = scheduler.total_time();
    for _ in 0..200 {
        let holder = scheduler.turn_holder().unwrap();
        let spent = if holder == player {
            10
        } else {
            speeds
                .iter()
                .find(|(entity, _)| *entity == holder)
                .map(|(_, cost)| *cost)
                .unwrap()
        };

        let next = scheduler
            .end_turn_and_advance(&mut world, Tick(spent))
            .unwrap();
        assert_eq!(scheduler.turn_holder(), Some(next));
        assert!(scheduler.total_time() >= last_total);
        assert!(scheduler.round_time() < scheduler.time_in_round());
        assert_eq!(
            scheduler.round_count() * scheduler.time_in_round().get()
                + scheduler.round_time().get(),
            scheduler.total_time().get()
        );
        last_total = scheduler.total_time();
    }
}
