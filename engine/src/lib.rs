//! Round lifecycle and bet submission for splitbet.
//!
//! The active round of a room is always derived from wall-clock time and
//! the room's epoch start ([`clock`]); [`RoundController`] caches the
//! per-room result and refreshes it when a [`Countdown`] signals rollover.
//! [`BetSubmissionService`] validates bets against the shared
//! [`AccountStore`] and reconciles the balance from the server after every
//! accepted submission.

pub mod account;
pub mod bets;
pub mod clock;
pub mod controller;
pub mod countdown;

pub use account::AccountStore;
pub use bets::{BetError, BetSubmissionService};
pub use controller::{display_code, RoundController};
pub use countdown::{Countdown, CountdownView, TICK_INTERVAL};
