use crate::domain::{
    GoalAction, Money, PendingScope, RequestId, RequestKind, Role, TransactionKind,
};

/// One caller-facing operation, as produced by the ingestion layer. The
/// provisioning variants (`RegisterUser`, `ProvisionGoalAccount`) are applied
/// out-of-band to the gate and store; everything else goes through the
/// engine under an authenticated principal.
#[derive(Debug, Clone)]
pub enum Command {
    RegisterUser {
        token: String,
        user_id: String,
        role: Role,
    },
    ProvisionGoalAccount {
        user_id: String,
        primary: Money,
        target: Money,
    },
    GoalAction {
        token: String,
        action: GoalAction,
        amount: Money,
    },
    CreateRequest {
        token: String,
        kind: RequestKind,
        amount: Money,
        purpose: String,
        link: Option<String>,
        notes: Option<String>,
    },
    Approve {
        token: String,
        request_id: RequestId,
        fulfilled: Money,
        receipt_ref: Option<String>,
        note: Option<String>,
    },
    Deny {
        token: String,
        request_id: RequestId,
        note: Option<String>,
    },
    Post {
        token: String,
        user_id: String,
        kind: TransactionKind,
        amount: Money,
        memo: String,
    },
    Snapshot {
        token: String,
    },
    ListPending {
        token: String,
        scope: PendingScope,
    },
    ListBalances {
        token: String,
    },
}
