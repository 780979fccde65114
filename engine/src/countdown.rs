use crate::controller::RoundController;
use splitbet_types::{RoomId, ScheduleError};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::{mpsc, watch};
use tokio::time;
use tracing::warn;

/// Default wall-clock tick interval.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Read model published to the presentation layer on every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownView {
    pub room: RoomId,
    pub round_index: u64,
    pub round_number: u64,
    pub remaining: Duration,
}

/// Countdown for one observed room.
///
/// A background task ticks on a fixed wall-clock interval and recomputes the
/// remaining time as `round end - now` (clamped at zero) rather than
/// decrementing a counter, so suspended or missed ticks cannot drift. When
/// remaining time reaches zero it asks the controller to re-derive the
/// active round, emits the new index on the rollover channel exactly once,
/// and immediately resumes counting down the fresh round.
///
/// Dropping the handle cancels the task; no tick or rollover event fires
/// after that.
pub struct Countdown {
    view: watch::Receiver<CountdownView>,
    rollovers: mpsc::UnboundedReceiver<u64>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl Countdown {
    pub fn start(controller: Arc<RoundController>, room: RoomId) -> Result<Self, ScheduleError> {
        Self::start_with_interval(controller, room, TICK_INTERVAL)
    }

    pub fn start_with_interval(
        controller: Arc<RoundController>,
        room: RoomId,
        tick: Duration,
    ) -> Result<Self, ScheduleError> {
        let initial = sample(&controller, room)?;
        let (view_tx, view_rx) = watch::channel(initial);
        let (rollover_tx, rollover_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(run(controller, room, tick, view_tx, rollover_tx));

        Ok(Self {
            view: view_rx,
            rollovers: rollover_rx,
            handle,
        })
    }

    /// Latest published view.
    pub fn view(&self) -> CountdownView {
        self.view.borrow().clone()
    }

    /// Subscribe to view updates (one per tick).
    pub fn subscribe(&self) -> watch::Receiver<CountdownView> {
        self.view.clone()
    }

    /// Next rollover, yielding the new active round index. Returns `None`
    /// once the countdown task has stopped.
    pub async fn next_rollover(&mut self) -> Option<u64> {
        self.rollovers.recv().await
    }
}

async fn run(
    controller: Arc<RoundController>,
    room: RoomId,
    tick: Duration,
    view_tx: watch::Sender<CountdownView>,
    rollover_tx: mpsc::UnboundedSender<u64>,
) {
    let mut interval = time::interval(tick);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;

        let expired = match sample(&controller, room) {
            Ok(view) => {
                let expired = view.remaining.is_zero();
                if !expired {
                    let _ = view_tx.send(view);
                }
                expired
            }
            Err(err) => {
                warn!(room, %err, "countdown sample failed");
                return;
            }
        };
        if !expired {
            continue;
        }

        // Expired: re-derive the active round, then re-enter the running
        // state with the recomputed remaining time.
        let index = match controller.handle_rollover(room) {
            Ok(index) => index,
            Err(err) => {
                warn!(room, %err, "round rollover failed");
                return;
            }
        };
        let _ = rollover_tx.send(index);
        match sample(&controller, room) {
            Ok(view) => {
                let _ = view_tx.send(view);
            }
            Err(err) => {
                warn!(room, %err, "countdown sample failed");
                return;
            }
        }
    }
}

/// Remaining time for the controller's cached round, clamped at zero when
/// the round end has already passed.
fn sample(controller: &RoundController, room: RoomId) -> Result<CountdownView, ScheduleError> {
    let end = controller.round_end(room)?;
    let remaining = end
        .duration_since(SystemTime::now())
        .unwrap_or(Duration::ZERO);
    Ok(CountdownView {
        room,
        round_index: controller.round_index(room)?,
        round_number: controller.round_number(room)?,
        remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitbet_types::RoomSchedule;
    use tokio::time::{sleep, timeout};

    const ROUND: Duration = Duration::from_millis(400);
    const TICK: Duration = Duration::from_millis(25);

    fn controller_started_at(offset_into_round: Duration) -> Arc<RoundController> {
        let epoch = SystemTime::now() - offset_into_round;
        let schedule = RoomSchedule::with_duration(vec![epoch], ROUND);
        Arc::new(RoundController::new(schedule).unwrap())
    }

    #[tokio::test]
    async fn test_remaining_is_bounded_and_derived() {
        let controller = controller_started_at(Duration::from_millis(50));
        let countdown =
            Countdown::start_with_interval(controller, 1, TICK).unwrap();

        for _ in 0..10 {
            sleep(TICK).await;
            let view = countdown.view();
            assert!(view.remaining <= ROUND);
        }
    }

    #[tokio::test]
    async fn test_rollover_fires_once_per_boundary() {
        let controller = controller_started_at(Duration::ZERO);
        let mut countdown =
            Countdown::start_with_interval(controller.clone(), 1, TICK).unwrap();
        assert_eq!(countdown.view().round_index, 0);

        let index = timeout(ROUND * 3, countdown.next_rollover())
            .await
            .expect("rollover not signaled")
            .expect("countdown stopped");
        assert_eq!(index, 1);
        assert_eq!(controller.round_index(1), Ok(1));

        // The next rollover is a full round away, not another immediate fire.
        let second = timeout(ROUND * 3, countdown.next_rollover())
            .await
            .expect("second rollover not signaled")
            .expect("countdown stopped");
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn test_view_resumes_after_rollover() {
        let controller = controller_started_at(Duration::ZERO);
        let mut countdown =
            Countdown::start_with_interval(controller, 1, TICK).unwrap();

        countdown.next_rollover().await.unwrap();
        let view = countdown.view();
        assert_eq!(view.round_index, 1);
        assert_eq!(view.round_number, 1 + splitbet_types::ROUND_NUMBER_OFFSET);
        assert!(view.remaining > Duration::ZERO && view.remaining <= ROUND);
    }

    #[tokio::test]
    async fn test_stale_seed_corrects_to_clock_on_first_tick() {
        // Controller seeded three full rounds ago; the first expiry must land
        // on the clock-derived index, not 1.
        let epoch = SystemTime::now() - (ROUND * 3 + Duration::from_millis(20));
        let schedule = RoomSchedule::with_duration(vec![epoch], ROUND);
        let controller =
            Arc::new(RoundController::new_at(schedule, epoch + Duration::from_millis(10)).unwrap());
        assert_eq!(controller.round_index(1), Ok(0));

        let mut countdown =
            Countdown::start_with_interval(controller.clone(), 1, TICK).unwrap();
        let index = timeout(ROUND, countdown.next_rollover())
            .await
            .expect("rollover not signaled")
            .expect("countdown stopped");
        assert!(index >= 3, "expected clock-derived index, got {index}");
        assert_eq!(controller.round_index(1), Ok(index));
    }

    #[tokio::test]
    async fn test_drop_cancels_pending_ticks() {
        let controller = controller_started_at(Duration::ZERO);
        let countdown =
            Countdown::start_with_interval(controller, 1, TICK).unwrap();
        let mut view_rx = countdown.subscribe();

        drop(countdown);

        // The task is aborted: the sender side closes and no further updates
        // arrive.
        timeout(ROUND * 2, async {
            while view_rx.changed().await.is_ok() {}
        })
        .await
        .expect("watch channel never closed after drop");
    }
}
