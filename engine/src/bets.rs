use crate::account::AccountStore;
use crate::controller::RoundController;
use splitbet_client::{Client, TokenStore};
use splitbet_types::api::BetRequest;
use splitbet_types::{Bet, RoomId, ScheduleError, Side, SideLabels};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors surfaced to the user when a bet cannot be placed. The `Display`
/// strings are the notification texts shown as-is.
#[derive(Debug, Error)]
pub enum BetError {
    #[error("user id is not found")]
    NoAccount,
    #[error("bet amount must be greater than 0")]
    InvalidAmount,
    #[error("bet amount must not exceed user point")]
    InsufficientBalance,
    #[error("another bet is already being submitted")]
    SubmissionInProgress,
    #[error("failed to submit bet")]
    SubmissionFailed(#[source] splitbet_client::Error),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Validates and submits bets, then reconciles the account balance from the
/// server's authoritative response.
pub struct BetSubmissionService<T: TokenStore> {
    client: Client,
    accounts: AccountStore,
    tokens: Arc<T>,
    controller: Arc<RoundController>,
    labels: SideLabels,
    in_flight: AtomicBool,
}

impl<T: TokenStore> BetSubmissionService<T> {
    pub fn new(
        client: Client,
        accounts: AccountStore,
        tokens: Arc<T>,
        controller: Arc<RoundController>,
        labels: SideLabels,
    ) -> Self {
        Self {
            client,
            accounts,
            tokens,
            controller,
            labels,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Place a bet on the round currently active in `room`.
    ///
    /// Validation fails fast, first violation wins, and never reaches the
    /// network. The target round is captured here, by value: if the round
    /// rolls over while the request is in flight the submission is not
    /// re-targeted. On success the account balance is re-fetched and only
    /// the server's value is published; the balance is never decremented
    /// locally. No call is retried.
    pub async fn submit(&self, side: Side, amount: u64, room: RoomId) -> Result<Bet, BetError> {
        let account = self.accounts.get().ok_or(BetError::NoAccount)?;
        if amount == 0 {
            return Err(BetError::InvalidAmount);
        }
        if amount > account.point {
            return Err(BetError::InsufficientBalance);
        }
        // Session bootstrap installs the token together with the account; a
        // missing token means there is no usable session.
        let token = self.tokens.load().ok_or(BetError::NoAccount)?;

        // Reject a second submission while one is in flight rather than
        // validating it against a balance that is about to be stale.
        let _guard = InFlightGuard::claim(&self.in_flight).ok_or(BetError::SubmissionInProgress)?;

        let round = self.controller.round_index(room)?;
        let request = BetRequest {
            user_id: account.id,
            side: side.as_flag(),
            label: self.labels.label(side).to_string(),
            amount,
            room_id: room,
        };

        if let Err(err) = self.client.submit_bet(&token, &request).await {
            warn!(room, amount, %err, "bet submission failed");
            return Err(BetError::SubmissionFailed(err));
        }

        // Submit-then-refresh: the refreshed server state is the only
        // balance we trust. If the refresh fails the store stays untouched.
        let record = match self.client.fetch_user(&token, account.id).await {
            Ok(record) => record,
            Err(err) => {
                warn!(user = account.id, %err, "balance refresh failed");
                return Err(BetError::SubmissionFailed(err));
            }
        };
        self.tokens.store(&record.token);
        let refreshed = record.into_account();
        info!(
            room,
            round,
            amount,
            balance = refreshed.point,
            "bet accepted"
        );
        self.accounts.replace(refreshed);

        Ok(Bet {
            account: account.id,
            side,
            stake: amount,
            room,
            round,
        })
    }
}

/// Released on drop so every exit path clears the in-flight flag.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
