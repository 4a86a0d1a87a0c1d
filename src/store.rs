use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::{
    Error, GoalAccount, GoalActionRecord, Money, Request, RequestId, Store, Transaction,
    TransactionId,
};

/// In-memory store. Appends keep insertion order; goal accounts are keyed by
/// lowercased user id so lookups are case-insensitive. `flush` writes the
/// balances CSV to stdout.
#[derive(Default, Debug)]
pub struct MemoryStore {
    seq: u64,
    transactions: Vec<Transaction>,
    tx_index: HashMap<TransactionId, usize>,
    requests: Vec<Request>,
    request_index: HashMap<RequestId, usize>,
    goal_accounts: BTreeMap<String, GoalAccount>,
    goal_actions: Vec<GoalActionRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn append_transaction(&mut self, transaction: Transaction) -> Result<TransactionId, Error> {
        match self.tx_index.entry(transaction.id) {
            Entry::Vacant(e) => {
                let id = transaction.id;
                e.insert(self.transactions.len());
                self.transactions.push(transaction);
                Ok(id)
            }
            Entry::Occupied(_) => Err(Error::Storage(format!(
                "transaction id {} already exists",
                transaction.id
            ))),
        }
    }

    fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    fn create_request(&mut self, request: Request) -> Result<RequestId, Error> {
        match self.request_index.entry(request.id) {
            Entry::Vacant(e) => {
                let id = request.id;
                e.insert(self.requests.len());
                self.requests.push(request);
                Ok(id)
            }
            Entry::Occupied(_) => Err(Error::Storage(format!(
                "request id {} already exists",
                request.id
            ))),
        }
    }

    fn request(&self, id: RequestId) -> Option<&Request> {
        self.request_index.get(&id).map(|&i| &self.requests[i])
    }

    fn request_mut(&mut self, id: RequestId) -> Option<&mut Request> {
        self.request_index
            .get(&id)
            .map(|&i| &mut self.requests[i])
    }

    fn requests(&self) -> &[Request] {
        &self.requests
    }

    fn goal_account(&self, user_id: &str) -> Option<&GoalAccount> {
        self.goal_accounts.get(&user_id.to_ascii_lowercase())
    }

    fn goal_account_mut(&mut self, user_id: &str) -> Option<&mut GoalAccount> {
        self.goal_accounts.get_mut(&user_id.to_ascii_lowercase())
    }

    fn insert_goal_account(&mut self, account: GoalAccount) -> Result<(), Error> {
        let key = account.user_id.to_ascii_lowercase();
        if self.goal_accounts.contains_key(&key) {
            return Err(Error::Storage(format!(
                "goal account for {} already exists",
                account.user_id
            )));
        }
        self.goal_accounts.insert(key, account);
        Ok(())
    }

    fn goal_accounts(&self) -> impl Iterator<Item = &GoalAccount> {
        self.goal_accounts.values()
    }

    fn append_goal_action(&mut self, record: GoalActionRecord) {
        self.goal_actions.push(record);
    }

    fn goal_actions(&self) -> &[GoalActionRecord] {
        &self.goal_actions
    }

    fn flush(&mut self) {
        let mut balances: BTreeMap<String, (String, Money)> = BTreeMap::new();
        for tx in &self.transactions {
            if !tx.counts_toward_balance() {
                continue;
            }
            let entry = balances
                .entry(tx.user_id.to_ascii_lowercase())
                .or_insert_with(|| (tx.user_id.clone(), Money::zero()));
            entry.1 += tx.amount;
        }

        println!("user,balance");
        for (user, balance) in balances.values() {
            println!("{},{}", user, balance);
        }
        println!("user,primary,goal,target");
        for account in self.goal_accounts.values() {
            println!(
                "{},{},{},{}",
                account.user_id, account.primary, account.goal, account.target
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::domain::{
        Error, GoalAccount, Money, Store, Transaction, TransactionKind, TransactionStatus,
    };

    fn tx(id: u64) -> Transaction {
        Transaction {
            id,
            created_at: id,
            user_id: "kid1".to_owned(),
            kind: TransactionKind::Deposit,
            amount: Money(100),
            status: TransactionStatus::Posted,
            memo: String::new(),
            request_id: None,
            entered_by: "parent".to_owned(),
        }
    }

    #[test]
    fn duplicate_transaction_id_is_rejected() {
        let mut store = MemoryStore::new();
        store.append_transaction(tx(1)).unwrap();
        let err = store.append_transaction(tx(1)).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn goal_account_lookup_ignores_case() {
        let mut store = MemoryStore::new();
        store
            .insert_goal_account(GoalAccount::new(
                "Kid2".to_owned(),
                Money(5000),
                Money(20000),
            ))
            .unwrap();
        assert!(store.goal_account("kid2").is_some());
        assert!(store.goal_account("KID2").is_some());
        assert!(store.goal_account("kid3").is_none());
        assert!(store
            .insert_goal_account(GoalAccount::new("KID2".to_owned(), Money(0), Money(0)))
            .is_err());
    }

    #[test]
    fn seq_is_monotonic() {
        let mut store = MemoryStore::new();
        let a = store.next_seq();
        let b = store.next_seq();
        assert!(b > a);
    }
}
