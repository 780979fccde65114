use crate::room::RoomId;
use serde::{Deserialize, Serialize};

/// The authenticated user as last confirmed by the server.
///
/// `point` is the spendable balance. Instances are only ever replaced
/// wholesale with server-confirmed state, never mutated field-by-field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub phone: String,
    pub point: u64,
    pub role: String,
}

/// The binary outcome a bet is staked on.
///
/// `Left` is the `false` side on the wire, `Right` the `true` side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_flag(&self) -> bool {
        matches!(self, Side::Right)
    }
}

/// Display labels for the two sides of a room's outcome.
#[derive(Clone, Debug)]
pub struct SideLabels {
    pub left: String,
    pub right: String,
}

impl SideLabels {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn label(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// A validated bet, captured by value at submission time.
///
/// `round` is the round index that was active when the submission started;
/// an in-flight bet is never re-targeted if the round rolls over underneath
/// it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bet {
    pub account: u64,
    pub side: Side,
    pub stake: u64,
    pub room: RoomId,
    pub round: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_flags() {
        assert!(!Side::Left.as_flag());
        assert!(Side::Right.as_flag());
    }

    #[test]
    fn test_side_labels() {
        let labels = SideLabels::new("DRAGON", "TIGER");
        assert_eq!(labels.label(Side::Left), "DRAGON");
        assert_eq!(labels.label(Side::Right), "TIGER");
    }
}
