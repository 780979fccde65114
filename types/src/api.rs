//! Wire types for the splitbet HTTP API.

use crate::account::Account;
use crate::room::RoomId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_PHONE_LENGTH: usize = 10;
const MIN_PASSWORD_LENGTH: usize = 5;

/// Body of `POST /game/bet`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetRequest {
    pub user_id: u64,
    pub side: bool,
    pub label: String,
    pub amount: u64,
    pub room_id: RoomId,
}

/// Body of a `GET /users/{id}` response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserEnvelope {
    pub result: UserRecord,
}

/// The server's view of a user, including a rotated bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub phone: String,
    pub point: u64,
    pub role: String,
    pub token: String,
}

impl UserRecord {
    pub fn into_account(self) -> Account {
        Account {
            id: self.id,
            phone: self.phone,
            point: self.point,
            role: self.role,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("phone number must be at least {MIN_PHONE_LENGTH} characters")]
    PhoneTooShort,
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("password confirmation does not match")]
    ConfirmationMismatch,
}

/// Body of `POST /users`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterRequest {
    pub fn new(phone: impl Into<String>, password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            phone: phone.into(),
            confirm_password: password.clone(),
            password,
        }
    }

    /// Local validation, checked before any network call is made.
    pub fn validate(&self) -> Result<(), RegisterError> {
        if self.password != self.confirm_password {
            return Err(RegisterError::ConfirmationMismatch);
        }
        if self.phone.len() < MIN_PHONE_LENGTH {
            return Err(RegisterError::PhoneTooShort);
        }
        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(RegisterError::PasswordTooShort);
        }
        Ok(())
    }
}
