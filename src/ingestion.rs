use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{
    Command, Error, GoalAction, Money, PendingScope, RequestKind, Role, TransactionKind,
};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Result<Self, Error> {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Ok(Self { reader: Some(rdr) })
    }
}

/// Internal shape used only for CSV deserialization. Columns:
/// `op, token, user, kind, amount, request, target, link, notes, memo`.
/// The `link` column doubles as the receipt reference on approval rows.
#[derive(Debug, Deserialize)]
struct CsvRow {
    op: String,
    token: Option<String>,
    user: Option<String>,
    kind: Option<String>,
    amount: Option<Money>,
    request: Option<u64>,
    target: Option<Money>,
    link: Option<String>,
    notes: Option<String>,
    memo: Option<String>,
}

fn required<T>(value: Option<T>, op: &str, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| Error::Ingestion(format!("{op} row is missing the {field} column")))
}

fn parse_role(s: &str) -> Result<Role, Error> {
    match s.to_ascii_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "requester" => Ok(Role::Requester),
        other => Err(Error::Ingestion(format!("Invalid role: {}", other))),
    }
}

fn parse_goal_action(s: &str) -> Result<GoalAction, Error> {
    match s.to_ascii_lowercase().as_str() {
        "deposit" => Ok(GoalAction::Deposit),
        "transfer" => Ok(GoalAction::Transfer),
        other => Err(Error::Ingestion(format!("Invalid goal action: {}", other))),
    }
}

fn parse_request_kind(s: &str) -> Result<RequestKind, Error> {
    match s.to_ascii_lowercase().as_str() {
        "withdrawal" => Ok(RequestKind::Withdrawal),
        "deposit" => Ok(RequestKind::Deposit),
        other => Err(Error::Ingestion(format!("Invalid request kind: {}", other))),
    }
}

fn parse_scope(s: Option<&str>) -> Result<PendingScope, Error> {
    match s.map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("mine") => Ok(PendingScope::Mine),
        Some("all") => Ok(PendingScope::All),
        Some(other) => Err(Error::Ingestion(format!("Invalid scope: {}", other))),
    }
}

fn parse_transaction_kind(s: &str) -> Result<TransactionKind, Error> {
    match s.to_ascii_lowercase().as_str() {
        "deposit" => Ok(TransactionKind::Deposit),
        "withdrawal" => Ok(TransactionKind::Withdrawal),
        "adjustment" => Ok(TransactionKind::Adjustment),
        other => Err(Error::Ingestion(format!(
            "Invalid transaction kind: {}",
            other
        ))),
    }
}

impl TryFrom<CsvRow> for Command {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let op = row.op.trim().to_ascii_lowercase();
        match op.as_str() {
            "user" => Ok(Command::RegisterUser {
                token: required(row.token, &op, "token")?,
                user_id: required(row.user, &op, "user")?,
                role: parse_role(&required(row.kind, &op, "kind")?)?,
            }),
            "account" => Ok(Command::ProvisionGoalAccount {
                user_id: required(row.user, &op, "user")?,
                primary: required(row.amount, &op, "amount")?,
                target: row.target.unwrap_or_else(Money::zero),
            }),
            "goal" => Ok(Command::GoalAction {
                token: required(row.token, &op, "token")?,
                action: parse_goal_action(&required(row.kind, &op, "kind")?)?,
                amount: required(row.amount, &op, "amount")?,
            }),
            "request" => Ok(Command::CreateRequest {
                token: required(row.token, &op, "token")?,
                kind: parse_request_kind(&required(row.kind, &op, "kind")?)?,
                amount: required(row.amount, &op, "amount")?,
                purpose: row.memo.unwrap_or_default(),
                link: row.link,
                notes: row.notes,
            }),
            "approve" => Ok(Command::Approve {
                token: required(row.token, &op, "token")?,
                request_id: required(row.request, &op, "request")?,
                fulfilled: required(row.amount, &op, "amount")?,
                receipt_ref: row.link,
                note: row.memo,
            }),
            "deny" => Ok(Command::Deny {
                token: required(row.token, &op, "token")?,
                request_id: required(row.request, &op, "request")?,
                note: row.memo,
            }),
            "post" => Ok(Command::Post {
                token: required(row.token, &op, "token")?,
                user_id: required(row.user, &op, "user")?,
                kind: parse_transaction_kind(&required(row.kind, &op, "kind")?)?,
                amount: required(row.amount, &op, "amount")?,
                memo: row.memo.unwrap_or_default(),
            }),
            "snapshot" => Ok(Command::Snapshot {
                token: required(row.token, &op, "token")?,
            }),
            "pending" => Ok(Command::ListPending {
                token: required(row.token, &op, "token")?,
                scope: parse_scope(row.kind.as_deref())?,
            }),
            "balances" => Ok(Command::ListBalances {
                token: required(row.token, &op, "token")?,
            }),
            other => Err(Error::Ingestion(format!("Invalid operation: {}", other))),
        }
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvReader<R> {
    type CmdStream = Pin<Box<dyn Stream<Item = Result<Command, Error>> + Send>>;

    fn stream(&mut self) -> Self::CmdStream {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<Command, Error>>::new()));
            }
        };

        let iter = reader.into_deserialize::<CsvRow>().map(|row_res| match row_res {
            Ok(row) => Command::try_from(row),
            Err(e) => Err(Error::Ingestion(format!("CSV deserialization error: {}", e))),
        });

        Box::pin(stream::iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::CsvReader;
    use crate::domain::traits::CommandStream;
    use crate::domain::{Command, Money, RequestKind, Role};

    #[tokio::test]
    async fn parses_commands_and_reports_bad_rows() {
        let input = "op,token,user,kind,amount,request,target,link,notes,memo\n\
            user,t1,parent,admin,,,,,,\n\
            request,t2,,withdrawal,15.00,,,https://shop.example/7,used is fine,new book\n\
            approve,t1,,,12.00,2,,rcpt-55,,partial\n\
            bogus,t1,,,,,,,,\n\
            goal,t2,,transfer,abc,,,,,";
        let mut reader = CsvReader::new(input.as_bytes()).unwrap();
        let rows: Vec<_> = reader.stream().collect().await;
        assert_eq!(rows.len(), 5);

        match rows[0].as_ref().unwrap() {
            Command::RegisterUser { user_id, role, .. } => {
                assert_eq!(user_id, "parent");
                assert_eq!(*role, Role::Admin);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        match rows[1].as_ref().unwrap() {
            Command::CreateRequest {
                kind,
                amount,
                purpose,
                link,
                notes,
                ..
            } => {
                assert_eq!(*kind, RequestKind::Withdrawal);
                assert_eq!(*amount, Money(1500));
                assert_eq!(purpose, "new book");
                assert_eq!(link.as_deref(), Some("https://shop.example/7"));
                assert_eq!(notes.as_deref(), Some("used is fine"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        match rows[2].as_ref().unwrap() {
            Command::Approve {
                request_id,
                fulfilled,
                receipt_ref,
                ..
            } => {
                assert_eq!(*request_id, 2);
                assert_eq!(*fulfilled, Money(1200));
                assert_eq!(receipt_ref.as_deref(), Some("rcpt-55"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(rows[3].is_err());
        assert!(rows[4].is_err());
    }

    #[tokio::test]
    async fn overlong_amount_fails_the_row_not_the_stream() {
        // a 40-digit fraction overflows the cent scaling; the row is
        // rejected and later rows still parse
        let input = format!(
            "op,token,user,kind,amount,request,target,link,notes,memo\n\
             goal,t2,,deposit,1.{},,,,,\n\
             user,t1,parent,admin,,,,,,",
            "0".repeat(40)
        );
        let mut reader = CsvReader::new(std::io::Cursor::new(input.into_bytes())).unwrap();
        let rows: Vec<_> = reader.stream().collect().await;
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_err());
        assert!(matches!(
            rows[1].as_ref().unwrap(),
            Command::RegisterUser { .. }
        ));
    }
}
