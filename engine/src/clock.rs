//! Pure derivation of the active round from wall-clock time.
//!
//! Every function derives from the room's epoch start; nothing here ever
//! increments a previously computed value, so results cannot drift no matter
//! how often or how irregularly they are sampled.

use splitbet_types::{RoomId, RoomSchedule, ScheduleError};
use std::time::{Duration, SystemTime};

/// Round index active in `room` at `now`: `floor((now - epoch) / duration)`.
///
/// `now` before the room's epoch start is a configuration error.
pub fn current_round_index(
    schedule: &RoomSchedule,
    room: RoomId,
    now: SystemTime,
) -> Result<u64, ScheduleError> {
    let elapsed = elapsed_since_epoch(schedule, room, now)?;
    Ok((elapsed.as_millis() / schedule.round_duration().as_millis()) as u64)
}

/// Instant at which round `index` of `room` ends (and round `index + 1`
/// begins).
pub fn round_end(
    schedule: &RoomSchedule,
    room: RoomId,
    index: u64,
) -> Result<SystemTime, ScheduleError> {
    let epoch = schedule.epoch_start(room)?;
    let end_ms = schedule.round_duration().as_millis() as u64 * (index + 1);
    Ok(epoch + Duration::from_millis(end_ms))
}

/// Time left in the round active at `now`:
/// `duration - ((now - epoch) mod duration)`, always in `(0, duration]`.
pub fn remaining_in_round(
    schedule: &RoomSchedule,
    room: RoomId,
    now: SystemTime,
) -> Result<Duration, ScheduleError> {
    let elapsed = elapsed_since_epoch(schedule, room, now)?;
    let duration = schedule.round_duration();
    let into_round = Duration::from_millis((elapsed.as_millis() % duration.as_millis()) as u64);
    Ok(duration - into_round)
}

fn elapsed_since_epoch(
    schedule: &RoomSchedule,
    room: RoomId,
    now: SystemTime,
) -> Result<Duration, ScheduleError> {
    let epoch = schedule.epoch_start(room)?;
    now.duration_since(epoch)
        .map_err(|_| ScheduleError::EpochInFuture { room })
}
