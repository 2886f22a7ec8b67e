use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::ecs::{ComponentStore, StoreError};
use crate::state::{Ai, EntityId, Player, Tick, TimeOfNextAction};

use super::clock::RoundClock;
use super::events::{EventListener, ListenerId, Notifier, TurnEvent};
use super::queue::TurnQueue;
use super::{ControlPhase, TurnError, TurnPhase, TurnSnapshot};

/// Result of checking a queued entity against the store before dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Schedulability {
    /// Live, has a behaviour source, ready at the given authoritative time.
    Ready(Tick),
    /// Destroyed or no longer able to act; the entry must be purged.
    Gone,
}

fn schedulability<S: ComponentStore>(store: &S, entity: EntityId) -> Schedulability {
    if !store.is_alive(entity) {
        return Schedulability::Gone;
    }
    if !store.has_component::<Player>(entity) && !store.has_component::<Ai>(entity) {
        return Schedulability::Gone;
    }
    match store.get_component::<TimeOfNextAction>(entity) {
        Ok(time) => Schedulability::Ready(time.tick()),
        Err(_) => Schedulability::Gone,
    }
}

/// Turn scheduler binding a [`TurnQueue`] and a [`RoundClock`] to an
/// entity-component store.
///
/// One instance per simulation; the game loop owns it and passes the store in
/// on every call. The scheduler exclusively owns the queue, the clocks and the
/// identity of the turn holder. Everything else can only read them.
///
/// A step is `end_turn` (charge the holder for its action) followed by
/// `next_turn` (pick the next holder and advance the clocks). Every fallible
/// step computes its outcome before touching scheduler state, so a returned
/// error leaves the clocks, holder and listeners untouched.
#[derive(Debug)]
pub struct TurnScheduler {
    config: SchedulerConfig,
    queue: TurnQueue,
    clock: RoundClock,
    holder: Option<EntityId>,
    phase: TurnPhase,
    control: Option<ControlPhase>,
    notifier: Notifier,
}

impl TurnScheduler {
    /// Creates an empty scheduler. The queue is built lazily on the first
    /// `next_turn`, or explicitly via [`TurnScheduler::build_new_turn_queue`]
    /// once entities are loaded.
    pub fn new(config: SchedulerConfig) -> Result<Self, TurnError> {
        config.validate()?;
        Ok(Self {
            clock: RoundClock::new(config.time_in_round),
            config,
            queue: TurnQueue::new(),
            holder: None,
            phase: TurnPhase::Uninitialised,
            control: None,
            notifier: Notifier::new(),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn subscribe(&mut self, listener: impl EventListener + 'static) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Entity currently holding the turn, if any.
    pub fn turn_holder(&self) -> Option<EntityId> {
        self.holder
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Macro-phase last announced to listeners.
    pub fn control(&self) -> Option<ControlPhase> {
        self.control
    }

    pub fn round_count(&self) -> u64 {
        self.clock.round_count()
    }

    pub fn total_time(&self) -> Tick {
        self.clock.total_time()
    }

    pub fn round_time(&self) -> Tick {
        self.clock.round_time()
    }

    pub fn time_of_last_turn(&self) -> Tick {
        self.clock.time_of_last_turn()
    }

    pub fn time_in_round(&self) -> Tick {
        self.clock.time_in_round()
    }

    pub fn queue(&self) -> &TurnQueue {
        &self.queue
    }

    /// Read-only view for UI and debug overlays.
    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            holder: self.holder,
            holder_is_player: self.holder.is_some()
                && self.control == Some(ControlPhase::PlayerTurn),
            phase: self.phase,
            total_time: self.clock.total_time(),
            time_of_last_turn: self.clock.time_of_last_turn(),
            round_time: self.clock.round_time(),
            round_count: self.clock.round_count(),
            time_in_round: self.clock.time_in_round(),
            queue: self.queue.iter().collect(),
        }
    }

    /// Rebuilds the queue from every schedulable entity in the store and hands
    /// the turn to the earliest one.
    ///
    /// Any previous holder loses the turn. Clocks are not advanced; the next
    /// `next_turn` accounts for the time up to the selected holder.
    pub fn build_new_turn_queue<S: ComponentStore>(
        &mut self,
        store: &S,
    ) -> Result<EntityId, TurnError> {
        info!(target: "chronicle::scheduler", "building a new turn queue");

        let player = self.designated_player(store)?;
        let queue = self.collect_schedulable(store)?;
        let (entity, _) = queue
            .peek_min()
            .ok_or_else(|| TurnError::empty_schedule(self.clock.total_time()))?;

        self.queue = queue;
        self.holder = Some(entity);
        self.phase = TurnPhase::Active;
        let is_player = player == Some(entity);
        self.control = Some(ControlPhase::for_holder(is_player));

        debug!(
            target: "chronicle::scheduler",
            holder = %entity,
            queue = ?self.queue.iter().collect::<Vec<_>>(),
            "turn queue built"
        );

        self.notifier
            .publish(&[TurnEvent::TurnHolderChanged { entity, is_player }]);
        Ok(entity)
    }

    /// Recovery path for a holder that vanished before acting: discards the
    /// queue and builds a fresh one.
    pub fn rebuild_turn_queue<S: ComponentStore>(
        &mut self,
        store: &S,
    ) -> Result<EntityId, TurnError> {
        warn!(
            target: "chronicle::scheduler",
            holder = ?self.holder,
            "rebuilding turn queue"
        );
        self.queue.clear();
        self.build_new_turn_queue(store)
    }

    /// Adds an entity that just became schedulable (spawned, or gained a
    /// behaviour source) to the queue.
    ///
    /// Its time of next action must not lie before the last turn, and a
    /// player entity must be the only one carrying [`Player`].
    pub fn schedule<S: ComponentStore>(
        &mut self,
        store: &S,
        entity: EntityId,
    ) -> Result<Tick, TurnError> {
        if store.has_component::<Player>(entity) {
            self.designated_player(store)?;
        }
        match schedulability(store, entity) {
            Schedulability::Ready(at) => {
                self.clock.progress_to(entity, at)?;
                self.queue.insert_or_update(entity, at);
                debug!(target: "chronicle::scheduler", %entity, ready_at = %at, "entity scheduled");
                Ok(at)
            }
            Schedulability::Gone => Err(TurnError::not_schedulable(
                entity,
                self.clock.total_time(),
            )),
        }
    }

    /// Drops `entity` from the queue, typically because it was destroyed.
    /// If it held the turn, the turn is released without charging any time.
    pub fn unschedule(&mut self, entity: EntityId) -> bool {
        let removed = self.queue.remove(entity).is_some();
        if self.holder == Some(entity) {
            self.holder = None;
            self.phase = TurnPhase::Resolving;
        }
        if removed {
            debug!(target: "chronicle::scheduler", %entity, "entity unscheduled");
        }
        removed
    }

    /// Charges the holder `spent_time` and releases the turn.
    ///
    /// The holder's [`TimeOfNextAction`] component is advanced in the store and
    /// the queue entry refreshed from it. The next holder is chosen by
    /// [`TurnScheduler::next_turn`].
    pub fn end_turn<S: ComponentStore>(
        &mut self,
        store: &mut S,
        spent_time: Tick,
    ) -> Result<(), TurnError> {
        let clock = self.clock.total_time();
        let entity = self.holder.ok_or_else(|| TurnError::no_turn_holder(clock))?;

        if schedulability(store, entity) == Schedulability::Gone {
            warn!(
                target: "chronicle::scheduler",
                %entity,
                "turn holder disappeared before ending its turn"
            );
            self.queue.remove(entity);
            self.holder = None;
            self.phase = TurnPhase::Resolving;
            return Ok(());
        }

        let time = store.get_component_mut::<TimeOfNextAction>(entity)?;
        let next = time
            .spend(spent_time)
            .ok_or_else(|| TurnError::time_overflow(entity, clock))?;
        self.queue.insert_or_update(entity, next);
        self.holder = None;
        self.phase = TurnPhase::Resolving;

        debug!(
            target: "chronicle::scheduler",
            %entity,
            spent = %spent_time,
            next_action = %next,
            "turn ended"
        );
        Ok(())
    }

    /// Selects the next holder, advances the clocks, and notifies listeners.
    ///
    /// Destroyed or no-longer-schedulable entities met during selection are
    /// purged. An empty queue is rebuilt from the store first.
    pub fn next_turn<S: ComponentStore>(&mut self, store: &S) -> Result<EntityId, TurnError> {
        let player = self.designated_player(store)?;

        // A holder that skipped end_turn keeps its current time.
        if let Some(previous) = self.holder {
            self.refresh_entry(store, previous);
        }

        let (entity, ready_at) = self.select_next(store)?;
        let time_progressed = self.clock.progress_to(entity, ready_at)?;

        let ended_rounds = self.clock.advance(time_progressed);
        self.holder = Some(entity);
        self.phase = TurnPhase::Active;

        let is_player = player == Some(entity);
        let mut events: Vec<TurnEvent> = ended_rounds
            .into_iter()
            .map(|round_count| TurnEvent::RoundEnded { round_count })
            .collect();
        if is_player || self.control != Some(ControlPhase::EnemyTurn) {
            events.push(TurnEvent::TurnHolderChanged { entity, is_player });
        }
        self.control = Some(ControlPhase::for_holder(is_player));

        debug!(
            target: "chronicle::scheduler",
            holder = %entity,
            progressed = %time_progressed,
            total_time = %self.clock.total_time(),
            round = self.clock.round_count(),
            "next turn"
        );

        self.notifier.publish(&events);
        Ok(entity)
    }

    /// [`TurnScheduler::end_turn`] followed by [`TurnScheduler::next_turn`].
    pub fn end_turn_and_advance<S: ComponentStore>(
        &mut self,
        store: &mut S,
        spent_time: Tick,
    ) -> Result<EntityId, TurnError> {
        self.end_turn(store, spent_time)?;
        self.next_turn(&*store)
    }

    fn designated_player<S: ComponentStore>(
        &self,
        store: &S,
    ) -> Result<Option<EntityId>, TurnError> {
        match store.find_unique::<Player>() {
            Ok(entity) => Ok(Some(entity)),
            Err(StoreError::MarkerNotFound { .. }) if !self.config.require_player => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn collect_schedulable<S: ComponentStore>(&self, store: &S) -> Result<TurnQueue, TurnError> {
        let queue: TurnQueue = store
            .for_each_entity_with::<TimeOfNextAction>()
            .into_iter()
            .filter(|(entity, _)| {
                store.has_component::<Player>(*entity) || store.has_component::<Ai>(*entity)
            })
            .map(|(entity, time)| (entity, time.tick()))
            .collect();

        if queue.is_empty() {
            return Err(TurnError::empty_schedule(self.clock.total_time()));
        }
        Ok(queue)
    }

    fn refresh_entry<S: ComponentStore>(&mut self, store: &S, entity: EntityId) {
        match schedulability(store, entity) {
            Schedulability::Ready(at) => {
                self.queue.insert_or_update(entity, at);
            }
            Schedulability::Gone => {
                self.queue.remove(entity);
            }
        }
    }

    /// Earliest valid entry, after purging stale entries and resyncing cached
    /// times that drifted from the store.
    fn select_next<S: ComponentStore>(
        &mut self,
        store: &S,
    ) -> Result<(EntityId, Tick), TurnError> {
        loop {
            let Some((entity, cached)) = self.queue.peek_min() else {
                info!(target: "chronicle::scheduler", "turn queue empty; rebuilding from store");
                self.queue = self.collect_schedulable(store)?;
                continue;
            };

            match schedulability(store, entity) {
                Schedulability::Gone => {
                    self.queue.remove(entity);
                    debug!(target: "chronicle::scheduler", %entity, "purged stale queue entry");
                }
                Schedulability::Ready(at) if at != cached => {
                    self.queue.insert_or_update(entity, at);
                }
                Schedulability::Ready(at) => return Ok((entity, at)),
            }
        }
    }
}
