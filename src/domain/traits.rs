use futures::Stream;

use crate::domain::{
    Command, Error, GoalAccount, GoalActionRecord, Principal, Request, RequestId, Transaction,
    TransactionId,
};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<Command, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Persistence seam: ordered appends, full scans, and point updates over the
/// three record collections. Individual operations are atomic; the engine is
/// responsible for serializing multi-step sequences around them.
pub trait Store {
    /// Monotonic logical clock; also the source of record ids.
    fn next_seq(&mut self) -> u64;

    fn append_transaction(&mut self, transaction: Transaction) -> Result<TransactionId, Error>;
    fn transactions(&self) -> &[Transaction];

    fn create_request(&mut self, request: Request) -> Result<RequestId, Error>;
    fn request(&self, id: RequestId) -> Option<&Request>;
    fn request_mut(&mut self, id: RequestId) -> Option<&mut Request>;
    fn requests(&self) -> &[Request];

    /// Lookup is case-insensitive on the user id.
    fn goal_account(&self, user_id: &str) -> Option<&GoalAccount>;
    fn goal_account_mut(&mut self, user_id: &str) -> Option<&mut GoalAccount>;
    fn insert_goal_account(&mut self, account: GoalAccount) -> Result<(), Error>;
    fn goal_accounts(&self) -> impl Iterator<Item = &GoalAccount>;

    fn append_goal_action(&mut self, record: GoalActionRecord);
    fn goal_actions(&self) -> &[GoalActionRecord];

    fn flush(&mut self);
}

/// Session collaborator: resolves an opaque token to a principal. Absent or
/// expired sessions are authorization failures, never an anonymous caller.
pub trait AccessGate {
    fn authenticate(&self, token: &str) -> Result<Principal, Error>;
}
