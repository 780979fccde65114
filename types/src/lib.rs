pub mod account;
pub mod api;
pub mod room;

pub use account::{Account, Bet, Side, SideLabels};
pub use room::{RoomId, RoomSchedule, ScheduleError, ROUND_DURATION, ROUND_NUMBER_OFFSET};
