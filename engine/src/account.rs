use splitbet_types::Account;
use std::sync::{Arc, RwLock};

/// Shared cell holding the authenticated account.
///
/// Handles are cheap to clone and all point at the same cell. Writers are
/// session bootstrap and the bet service's post-submission refresh; both
/// replace the account wholesale with server-confirmed state, so last write
/// wins.
#[derive(Clone, Debug, Default)]
pub struct AccountStore {
    inner: Arc<RwLock<Option<Account>>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(account: Account) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(account))),
        }
    }

    /// Snapshot of the current account, if a session is active.
    pub fn get(&self) -> Option<Account> {
        self.inner.read().unwrap().clone()
    }

    /// Replace the held account with a server-confirmed one.
    pub fn replace(&self, account: Account) {
        *self.inner.write().unwrap() = Some(account);
    }

    /// Drop the session.
    pub fn clear(&self) {
        *self.inner.write().unwrap() = None;
    }
}
