use crate::domain::{Money, RequestKind};

pub type TransactionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Posted,
    Pending,
}

/// One row of the append-only ledger. Posted rows are never edited or
/// removed; corrections are new `Adjustment` rows.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: TransactionId,
    /// Store-issued logical sequence number; monotonic ordering key.
    pub created_at: u64,
    pub user_id: String,
    pub kind: TransactionKind,
    /// Signed cent amount; negative for withdrawals.
    pub amount: Money,
    pub status: TransactionStatus,
    pub memo: String,
    /// Back-reference to the fulfilled request, when one produced this row.
    pub request_id: Option<u64>,
    pub entered_by: String,
}

impl Transaction {
    pub fn counts_toward_balance(&self) -> bool {
        self.status == TransactionStatus::Posted
    }
}

impl From<RequestKind> for TransactionKind {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::Withdrawal => TransactionKind::Withdrawal,
            RequestKind::Deposit => TransactionKind::Deposit,
        }
    }
}

impl core::fmt::Display for Transaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:?},user={},tx={},amount={}",
            self.kind, self.user_id, self.id, self.amount
        )
    }
}
