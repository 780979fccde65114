use crate::clock;
use rand::Rng;
use splitbet_types::{RoomId, RoomSchedule, ScheduleError, ROUND_NUMBER_OFFSET};
use std::sync::Mutex;
use std::time::SystemTime;
use tracing::debug;

/// Holds the cached active round index for every room.
///
/// The cache is seeded from the clock at construction and refreshed by
/// [`handle_rollover`](RoundController::handle_rollover). A rollover never
/// increments the cached value; it recomputes from the epoch, so a missed or
/// delayed tick self-corrects instead of compounding.
#[derive(Debug)]
pub struct RoundController {
    schedule: RoomSchedule,
    rounds: Mutex<Vec<u64>>,
}

impl RoundController {
    pub fn new(schedule: RoomSchedule) -> Result<Self, ScheduleError> {
        Self::new_at(schedule, SystemTime::now())
    }

    /// Seed the cache as of an explicit instant.
    pub fn new_at(schedule: RoomSchedule, now: SystemTime) -> Result<Self, ScheduleError> {
        let rounds = schedule
            .rooms()
            .map(|room| clock::current_round_index(&schedule, room, now))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            schedule,
            rounds: Mutex::new(rounds),
        })
    }

    pub fn schedule(&self) -> &RoomSchedule {
        &self.schedule
    }

    /// Cached active round index for a room.
    pub fn round_index(&self, room: RoomId) -> Result<u64, ScheduleError> {
        let rounds = self.rounds.lock().unwrap();
        room_slot(&rounds, room).map(|slot| rounds[slot])
    }

    /// Round number shown to players for a room's active round.
    pub fn round_number(&self, room: RoomId) -> Result<u64, ScheduleError> {
        Ok(self.round_index(room)? + ROUND_NUMBER_OFFSET)
    }

    /// Instant the cached round ends; the countdown derives remaining time
    /// from this on every tick.
    pub fn round_end(&self, room: RoomId) -> Result<SystemTime, ScheduleError> {
        clock::round_end(&self.schedule, room, self.round_index(room)?)
    }

    /// Refresh the cached round for a room after its countdown expired.
    ///
    /// Recomputes from the current wall-clock time rather than incrementing,
    /// so the result is correct even if more than one full round elapsed
    /// since the last tick. Returns the new active index.
    pub fn handle_rollover(&self, room: RoomId) -> Result<u64, ScheduleError> {
        self.handle_rollover_at(room, SystemTime::now())
    }

    pub fn handle_rollover_at(&self, room: RoomId, now: SystemTime) -> Result<u64, ScheduleError> {
        let index = clock::current_round_index(&self.schedule, room, now)?;
        let mut rounds = self.rounds.lock().unwrap();
        let slot = room_slot(&rounds, room)?;
        debug!(room, from = rounds[slot], to = index, "round rollover");
        rounds[slot] = index;
        Ok(index)
    }
}

fn room_slot(rounds: &[u64], room: RoomId) -> Result<usize, ScheduleError> {
    if room == 0 || room as usize > rounds.len() {
        return Err(ScheduleError::UnknownRoom { room });
    }
    Ok(room as usize - 1)
}

/// Five-digit code displayed beside the round header.
pub fn display_code<R: Rng>(rng: &mut R) -> String {
    rng.gen_range(10_000u32..100_000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const DURATION: Duration = Duration::from_secs(180);

    fn fixture() -> (RoomSchedule, SystemTime) {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let schedule = RoomSchedule::new(vec![t0, t0 + Duration::from_secs(60)]);
        (schedule, t0)
    }

    #[test]
    fn test_seeds_cache_from_clock() {
        let (schedule, t0) = fixture();
        let controller =
            RoundController::new_at(schedule, t0 + Duration::from_secs(180 * 3 + 90)).unwrap();

        assert_eq!(controller.round_index(1), Ok(3));
        // Room 2 started a minute later.
        assert_eq!(controller.round_index(2), Ok(3));
        assert_eq!(controller.round_number(1), Ok(3 + ROUND_NUMBER_OFFSET));
    }

    #[test]
    fn test_construction_fails_before_any_epoch() {
        let (schedule, t0) = fixture();
        // Before room 2's epoch, even though room 1 already started.
        let result = RoundController::new_at(schedule, t0 + Duration::from_secs(30));
        assert_eq!(result.err(), Some(ScheduleError::EpochInFuture { room: 2 }));
    }

    #[test]
    fn test_rollover_recomputes_rather_than_increments() {
        let (schedule, t0) = fixture();
        let controller = RoundController::new_at(schedule, t0).unwrap();
        assert_eq!(controller.round_index(1), Ok(0));

        // Two full rounds elapsed before the rollover was handled (e.g. a
        // suspended timer). The cache must land on the clock-derived index,
        // not on previous + 1.
        let new_index = controller
            .handle_rollover_at(1, t0 + DURATION * 2 + Duration::from_secs(5))
            .unwrap();
        assert_eq!(new_index, 2);
        assert_eq!(controller.round_index(1), Ok(2));
    }

    #[test]
    fn test_rollover_only_touches_its_room() {
        let (schedule, t0) = fixture();
        let controller = RoundController::new_at(schedule, t0 + Duration::from_secs(60)).unwrap();

        controller
            .handle_rollover_at(1, t0 + DURATION + Duration::from_secs(60))
            .unwrap();
        assert_eq!(controller.round_index(1), Ok(1));
        assert_eq!(controller.round_index(2), Ok(0));
    }

    #[test]
    fn test_round_end_tracks_cached_round() {
        let (schedule, t0) = fixture();
        let controller = RoundController::new_at(schedule, t0).unwrap();
        assert_eq!(controller.round_end(1), Ok(t0 + DURATION));

        controller.handle_rollover_at(1, t0 + DURATION).unwrap();
        assert_eq!(controller.round_end(1), Ok(t0 + DURATION * 2));
    }

    #[test]
    fn test_unknown_room_rejected() {
        let (schedule, t0) = fixture();
        let controller = RoundController::new_at(schedule, t0 + Duration::from_secs(60)).unwrap();
        assert_eq!(
            controller.round_index(3),
            Err(ScheduleError::UnknownRoom { room: 3 })
        );
        assert_eq!(
            controller.handle_rollover(0),
            Err(ScheduleError::UnknownRoom { room: 0 })
        );
    }

    #[test]
    fn test_display_code_is_five_digits() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let code = display_code(&mut rng);
            assert_eq!(code.len(), 5);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
