use crate::domain::now_millis;
use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper sanity bound for a single transaction amount, in minor units.
/// Requests above this are rejected outright instead of being overflow-
/// guarded everywhere downstream.
pub const MAX_TRANSACTION_AMOUNT: i64 = 1_000_000_000;

/// A validated transaction amount in minor units.
///
/// Guaranteed positive and within [`MAX_TRANSACTION_AMOUNT`], so engine
/// code can rely on the range instead of re-checking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self, CommerceError> {
        if value > 0 && value <= MAX_TRANSACTION_AMOUNT {
            Ok(Self(value))
        } else {
            Err(CommerceError::InvalidAmount)
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = CommerceError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A monetary account, one per user.
///
/// The balance is in minor units and never negative; only the ledger
/// engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Account {
    pub fn new(user_id: Uuid) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4(),
            user_id,
            balance: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Processing,
    Success,
    Failed,
}

/// Immutable audit record of one balance-mutation attempt.
///
/// Created with status [`TransactionStatus::Processing`] before the
/// balance write and finalized to `Success` or `Failed` in the same
/// commit. A `Failed` row is a permanent artifact, never rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Positive magnitude; the direction lives in `kind`.
    pub amount: i64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    pub created_at: i64,
}

impl MoneyTransaction {
    pub fn processing(
        account_id: Uuid,
        amount: Amount,
        kind: TransactionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            amount: amount.value(),
            kind,
            status: TransactionStatus::Processing,
            description: description.into(),
            created_at: now_millis(),
        }
    }
}
