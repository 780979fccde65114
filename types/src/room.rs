use std::time::{Duration, SystemTime};
use thiserror::Error;

/// Identifier of one of the parallel betting rooms. Room ids start at 1.
pub type RoomId = u8;

/// Length of a betting round in production.
pub const ROUND_DURATION: Duration = Duration::from_secs(3 * 60);

/// Offset between the zero-based round index and the round number shown
/// to players.
pub const ROUND_NUMBER_OFFSET: u64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unknown room: {room}")]
    UnknownRoom { room: RoomId },
    #[error("room {room} epoch start is in the future")]
    EpochInFuture { room: RoomId },
}

/// Immutable round schedule for the full set of rooms.
///
/// Room `r` began its round 0 at `epoch_starts[r - 1]`; every room shares the
/// same round duration.
#[derive(Clone, Debug)]
pub struct RoomSchedule {
    epoch_starts: Vec<SystemTime>,
    round_duration: Duration,
}

impl RoomSchedule {
    pub fn new(epoch_starts: Vec<SystemTime>) -> Self {
        Self::with_duration(epoch_starts, ROUND_DURATION)
    }

    /// Build a schedule with a non-standard round duration (tests use short
    /// rounds to observe rollovers in real time).
    pub fn with_duration(epoch_starts: Vec<SystemTime>, round_duration: Duration) -> Self {
        assert!(!round_duration.is_zero(), "round duration must be non-zero");
        Self {
            epoch_starts,
            round_duration,
        }
    }

    pub fn rooms(&self) -> impl Iterator<Item = RoomId> {
        1..=self.epoch_starts.len() as RoomId
    }

    pub fn room_count(&self) -> usize {
        self.epoch_starts.len()
    }

    pub fn round_duration(&self) -> Duration {
        self.round_duration
    }

    /// Epoch start (the instant round 0 began) for a room.
    pub fn epoch_start(&self, room: RoomId) -> Result<SystemTime, ScheduleError> {
        if room == 0 {
            return Err(ScheduleError::UnknownRoom { room });
        }
        self.epoch_starts
            .get(room as usize - 1)
            .copied()
            .ok_or(ScheduleError::UnknownRoom { room })
    }
}
