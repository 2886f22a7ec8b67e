use crate::state::{EntityId, Tick};

use super::TurnError;

/// Global and round-local time accounting.
///
/// `total_time` only moves forward. `round_time` stays in
/// `0..time_in_round`; any overflow is carried into the next round, so the
/// units consumed by completed rounds plus `round_time` always equal
/// `total_time`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundClock {
    total_time: Tick,
    time_of_last_turn: Tick,
    round_time: Tick,
    round_count: u64,
    time_in_round: Tick,
}

impl RoundClock {
    pub fn new(time_in_round: Tick) -> Self {
        Self {
            total_time: Tick::ZERO,
            time_of_last_turn: Tick::ZERO,
            round_time: Tick::ZERO,
            round_count: 0,
            time_in_round,
        }
    }

    pub fn total_time(&self) -> Tick {
        self.total_time
    }

    pub fn time_of_last_turn(&self) -> Tick {
        self.time_of_last_turn
    }

    pub fn round_time(&self) -> Tick {
        self.round_time
    }

    pub fn round_count(&self) -> u64 {
        self.round_count
    }

    pub fn time_in_round(&self) -> Tick {
        self.time_in_round
    }

    /// Time that passes if `entity`, ready at `ready_at`, takes the next turn.
    ///
    /// Does not mutate. A `ready_at` before the last turn means the schedule
    /// was corrupted and is reported, never clamped.
    pub fn progress_to(&self, entity: EntityId, ready_at: Tick) -> Result<Tick, TurnError> {
        ready_at.checked_sub(self.time_of_last_turn).ok_or_else(|| {
            TurnError::negative_time_progression(
                entity,
                ready_at,
                self.time_of_last_turn,
                self.total_time,
            )
        })
    }

    /// Advances both clocks by `time_progressed`.
    ///
    /// Returns the index of every round completed on the way, oldest first.
    /// Progress shorter than a round completes at most one. Longer progress
    /// closes each round it spans, so `round_time` stays below
    /// `time_in_round` instead of a single rollover leaving it past the end.
    pub fn advance(&mut self, time_progressed: Tick) -> Vec<u64> {
        self.total_time = self.total_time + time_progressed;
        self.time_of_last_turn = self.total_time;

        let mut ended = Vec::new();
        if self.completes_round(time_progressed) {
            ended.push(self.next_round(time_progressed));
            while self.completes_round(Tick::ZERO) {
                ended.push(self.next_round(Tick::ZERO));
            }
        } else {
            self.round_time = self.round_time + time_progressed;
        }
        ended
    }

    /// Closes the current round, carrying `round_time + time_progressed -
    /// time_in_round` into the next one. Returns the index of the round that
    /// ended.
    ///
    /// Only valid when `completes_round(time_progressed)` holds.
    fn next_round(&mut self, time_progressed: Tick) -> u64 {
        debug_assert!(self.completes_round(time_progressed));
        let (round_time, length) = (self.round_time.get(), self.time_in_round.get());
        let carried = match round_time.checked_sub(length) {
            Some(surplus) => surplus + time_progressed.get(),
            None => time_progressed.get() - (length - round_time),
        };
        self.round_time = Tick(carried);

        let ended = self.round_count;
        self.round_count += 1;
        tracing::debug!(
            target: "chronicle::clock",
            ended,
            round_time = %self.round_time,
            "round rolled over"
        );
        ended
    }

    /// Equivalent to `round_time + time_progressed >= time_in_round` without
    /// the overflow.
    fn completes_round(&self, time_progressed: Tick) -> bool {
        match self.time_in_round.checked_sub(self.round_time) {
            Some(room) => time_progressed >= room,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_carries_remainder() {
        let mut clock = RoundClock::new(Tick(100));
        assert!(clock.advance(Tick(95)).is_empty());

        let ended = clock.advance(Tick(12));
        assert_eq!(ended, vec![0]);
        assert_eq!(clock.round_time(), Tick(7));
        assert_eq!(clock.round_count(), 1);
        assert_eq!(clock.total_time(), Tick(107));
        assert_eq!(clock.time_of_last_turn(), Tick(107));
    }

    #[test]
    fn exact_fill_rolls_over_to_zero() {
        let mut clock = RoundClock::new(Tick(100));
        let mut ended = Vec::new();
        for step in [30, 30, 40] {
            ended.extend(clock.advance(Tick(step)));
        }

        assert_eq!(ended, vec![0]);
        assert_eq!(clock.round_time(), Tick::ZERO);
        assert_eq!(clock.round_count(), 1);
    }

    #[test]
    fn multi_round_progress_ends_each_round_once() {
        let mut clock = RoundClock::new(Tick(100));
        clock.advance(Tick(50));

        let ended = clock.advance(Tick(260));
        assert_eq!(ended, vec![0, 1, 2]);
        assert_eq!(clock.round_time(), Tick(10));
        assert_eq!(clock.round_count(), 3);
        assert_eq!(clock.total_time(), Tick(310));
    }

    #[test]
    fn zero_progress_changes_nothing() {
        let mut clock = RoundClock::new(Tick(100));
        clock.advance(Tick(40));
        let before = clock.clone();

        assert!(clock.advance(Tick::ZERO).is_empty());
        assert_eq!(clock, before);
    }

    #[test]
    fn progress_before_last_turn_is_an_error() {
        let mut clock = RoundClock::new(Tick(100));
        clock.advance(Tick(20));

        assert_eq!(clock.progress_to(EntityId(1), Tick(25)), Ok(Tick(5)));
        assert!(matches!(
            clock.progress_to(EntityId(1), Tick(19)),
            Err(TurnError::NegativeTimeProgression { .. })
        ));
    }

    #[test]
    fn conservation_holds_across_many_steps() {
        let mut clock = RoundClock::new(Tick(30));
        let mut rounds = 0u64;
        for step in [7u64, 0, 29, 31, 1, 90, 3, 14, 15, 60] {
            rounds += clock.advance(Tick(step)).len() as u64;
            assert!(clock.round_time() < clock.time_in_round());
            assert_eq!(
                clock.round_count() * 30 + clock.round_time().get(),
                clock.total_time().get()
            );
        }
        assert_eq!(rounds, clock.round_count());
    }
}
