pub mod account;
pub mod command;
pub mod error;
pub mod money;
pub mod principal;
pub mod request;
pub mod traits;
pub mod transaction;

pub use account::{GoalAccount, GoalAction, GoalActionRecord, GoalSnapshot};
pub use command::Command;
pub use error::Error;
pub use money::Money;
pub use principal::{Principal, Role, SYSTEM_DECIDER, Session};
pub use request::{PendingScope, Request, RequestId, RequestKind, RequestStatus};
pub use traits::{AccessGate, CommandStream, DeadLetterQueue, Store};
pub use transaction::{Transaction, TransactionId, TransactionKind, TransactionStatus};
