use std::collections::{BTreeSet, HashMap};

use crate::state::{EntityId, Tick};

/// Index from entity to its cached time of next action.
///
/// Entries are derived state: the authoritative value lives on the entity's
/// [`TimeOfNextAction`](crate::state::TimeOfNextAction) component and the
/// queue can be rebuilt from the store at any time.
///
/// Ordering is `(time, entity)`, so entities sharing the minimum time are
/// broken by the lowest [`EntityId`]. Selection never depends on hash order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnQueue {
    times: HashMap<EntityId, Tick>,
    order: BTreeSet<(Tick, EntityId)>,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheduled time for `entity`, inserting it if new.
    /// Returns the previously cached time.
    pub fn insert_or_update(&mut self, entity: EntityId, time: Tick) -> Option<Tick> {
        let previous = self.times.insert(entity, time);
        if let Some(old) = previous {
            self.order.remove(&(old, entity));
        }
        self.order.insert((time, entity));
        previous
    }

    /// Drops the entry for `entity`. No-op if absent.
    pub fn remove(&mut self, entity: EntityId) -> Option<Tick> {
        let previous = self.times.remove(&entity)?;
        self.order.remove(&(previous, entity));
        Some(previous)
    }

    /// Entity with the smallest scheduled time, lowest id on ties.
    pub fn peek_min(&self) -> Option<(EntityId, Tick)> {
        self.order.first().map(|&(time, entity)| (entity, time))
    }

    pub fn get(&self, entity: EntityId) -> Option<Tick> {
        self.times.get(&entity).copied()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.times.contains_key(&entity)
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn clear(&mut self) {
        self.times.clear();
        self.order.clear();
    }

    /// Entries in selection order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Tick)> + '_ {
        self.order.iter().map(|&(time, entity)| (entity, time))
    }
}

impl FromIterator<(EntityId, Tick)> for TurnQueue {
    fn from_iter<I: IntoIterator<Item = (EntityId, Tick)>>(iter: I) -> Self {
        let mut queue = Self::new();
        for (entity, time) in iter {
            queue.insert_or_update(entity, time);
        }
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_min_returns_earliest_time() {
        let queue: TurnQueue = [
            (EntityId(1), Tick(10)),
            (EntityId(2), Tick(5)),
            (EntityId(3), Tick(20)),
        ]
        .into_iter()
        .collect();

        assert_eq!(queue.peek_min(), Some((EntityId(2), Tick(5))));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn ties_break_on_lowest_entity_id() {
        let mut queue = TurnQueue::new();
        queue.insert_or_update(EntityId(9), Tick(4));
        queue.insert_or_update(EntityId(3), Tick(4));
        queue.insert_or_update(EntityId(6), Tick(4));

        for _ in 0..10 {
            assert_eq!(queue.peek_min(), Some((EntityId(3), Tick(4))));
        }
    }

    #[test]
    fn update_replaces_stale_ordering_entry() {
        let mut queue = TurnQueue::new();
        queue.insert_or_update(EntityId(1), Tick(5));
        queue.insert_or_update(EntityId(2), Tick(10));

        assert_eq!(queue.insert_or_update(EntityId(1), Tick(13)), Some(Tick(5)));
        assert_eq!(queue.peek_min(), Some((EntityId(2), Tick(10))));
        assert_eq!(
            queue.iter().collect::<Vec<_>>(),
            vec![(EntityId(2), Tick(10)), (EntityId(1), Tick(13))]
        );
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let mut queue = TurnQueue::new();
        assert_eq!(queue.remove(EntityId(4)), None);

        queue.insert_or_update(EntityId(4), Tick(1));
        assert_eq!(queue.remove(EntityId(4)), Some(Tick(1)));
        assert!(queue.is_empty());
        assert_eq!(queue.peek_min(), None);
    }
}
