use crate::domain::{
    Error, GoalAction, GoalActionRecord, GoalSnapshot, Money, PendingScope, Principal, Request,
    RequestId, RequestKind, SYSTEM_DECIDER, Store, Transaction, TransactionId, TransactionKind,
    TransactionStatus,
};

/// Policy knobs injected at construction; never read from globals.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policy {
    /// When set, deposit requests created by an unprivileged requester are
    /// fulfilled immediately by the system decider. Administrator-created
    /// requests always wait for a manual decision.
    pub auto_post_requester_deposits: bool,
}

/// Per-account view returned by `snapshot`.
#[derive(Debug, Clone)]
pub enum Snapshot {
    Goal(GoalSnapshot),
    Ledger {
        user_id: String,
        balance: Money,
        recent: Vec<Transaction>,
    },
}

/// Admin-facing balance listing.
#[derive(Debug, Clone)]
pub struct BalanceSheet {
    pub ledger: Vec<(String, Money)>,
    pub goals: Vec<GoalSnapshot>,
}

/// Ledger and approval-workflow engine. Every mutating operation takes
/// `&mut self`, so the exclusive borrow serializes each read-check-write
/// sequence against the store; callers sharing an engine across threads put
/// it behind a lock.
#[derive(Debug)]
pub struct Engine<S>
where
    S: Store,
{
    store: S,
    policy: Policy,
}

impl<S> Engine<S>
where
    S: Store,
{
    pub fn new(store: S, policy: Policy) -> Self {
        Self { store, policy }
    }

    /// Out-of-band access for provisioning and flushing; account creation is
    /// not a business operation of the engine.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn flush(&mut self) {
        self.store.flush();
    }

    /// Balance derived by summing the signed amounts of Posted transactions
    /// for the user. Pending rows never count.
    pub fn balance_of(&self, user_id: &str) -> Money {
        let mut total = Money::zero();
        for tx in self.store.transactions() {
            if tx.counts_toward_balance() && tx.user_id.eq_ignore_ascii_case(user_id) {
                total += tx.amount;
            }
        }
        total
    }

    /// Fresh snapshot of the user's transactions, newest first.
    pub fn recent_transactions(&self, user_id: &str, limit: usize) -> Vec<Transaction> {
        self.store
            .transactions()
            .iter()
            .rev()
            .filter(|tx| tx.user_id.eq_ignore_ascii_case(user_id))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn snapshot(&self, principal: &Principal) -> Snapshot {
        if let Some(account) = self.store.goal_account(&principal.user_id) {
            return Snapshot::Goal(account.snapshot());
        }
        Snapshot::Ledger {
            user_id: principal.user_id.clone(),
            balance: self.balance_of(&principal.user_id),
            recent: self.recent_transactions(&principal.user_id, 10),
        }
    }

    /// Administrator entry of a transaction outside the request workflow.
    /// Withdrawal amounts are stored negative; adjustments carry whichever
    /// sign the administrator supplies.
    pub fn post_direct(
        &mut self,
        principal: &Principal,
        user_id: &str,
        kind: TransactionKind,
        amount: Money,
        memo: &str,
        status: TransactionStatus,
    ) -> Result<TransactionId, Error> {
        require_admin(principal, "posting a transaction")?;
        let signed = match kind {
            TransactionKind::Deposit | TransactionKind::Withdrawal => {
                if !amount.is_positive() {
                    return Err(Error::Validation(format!(
                        "amount must be positive, got {amount}"
                    )));
                }
                if kind == TransactionKind::Withdrawal {
                    -amount
                } else {
                    amount
                }
            }
            TransactionKind::Adjustment => {
                if amount == Money::zero() {
                    return Err(Error::Validation("adjustment amount must be non-zero".into()));
                }
                amount
            }
        };
        let seq = self.store.next_seq();
        let id = self.store.append_transaction(Transaction {
            id: seq,
            created_at: seq,
            user_id: user_id.to_owned(),
            kind,
            amount: signed,
            status,
            memo: memo.to_owned(),
            request_id: None,
            entered_by: principal.user_id.clone(),
        })?;
        tracing::info!(user = user_id, %signed, ?kind, "posted direct transaction");
        Ok(id)
    }

    /// Creates a pending request; with the auto-post policy on, a deposit
    /// request from a requester is fulfilled in the same exclusive section,
    /// so no caller ever observes it as pending.
    pub fn create_request(
        &mut self,
        principal: &Principal,
        kind: RequestKind,
        amount: Money,
        purpose: &str,
        link: Option<String>,
        notes: Option<String>,
    ) -> Result<RequestId, Error> {
        if !amount.is_positive() {
            return Err(Error::Validation(format!(
                "requested amount must be positive, got {amount}"
            )));
        }
        if purpose.trim().is_empty() {
            return Err(Error::Validation("purpose must not be empty".into()));
        }
        let seq = self.store.next_seq();
        let id = self.store.create_request(Request::new(
            seq,
            seq,
            principal.user_id.clone(),
            kind,
            amount,
            purpose.trim().to_owned(),
            link,
            notes,
        ))?;
        tracing::info!(user = %principal.user_id, ?kind, %amount, request = id, "created request");

        if self.policy.auto_post_requester_deposits
            && kind == RequestKind::Deposit
            && !principal.is_admin()
        {
            self.decide_and_post(id, amount, None, None, SYSTEM_DECIDER)?;
            tracing::debug!(request = id, "auto-posted deposit request");
        }
        Ok(id)
    }

    /// Approves a pending request and posts the resulting transaction. The
    /// granted amount may differ from the requested one.
    pub fn approve_and_post(
        &mut self,
        principal: &Principal,
        request_id: RequestId,
        fulfilled: Money,
        receipt_ref: Option<String>,
        note: Option<String>,
    ) -> Result<TransactionId, Error> {
        require_admin(principal, "approving a request")?;
        self.decide_and_post(request_id, fulfilled, receipt_ref, note, &principal.user_id)
    }

    pub fn deny_request(
        &mut self,
        principal: &Principal,
        request_id: RequestId,
        note: Option<String>,
    ) -> Result<(), Error> {
        require_admin(principal, "denying a request")?;
        let seq = self.store.next_seq();
        let decided_by = principal.user_id.clone();
        let request = self
            .store
            .request_mut(request_id)
            .ok_or_else(|| Error::NotFound(format!("no request with id {request_id}")))?;
        request.deny(&decided_by, seq, note)?;
        tracing::info!(request = request_id, by = %decided_by, "denied request");
        Ok(())
    }

    fn decide_and_post(
        &mut self,
        request_id: RequestId,
        fulfilled: Money,
        receipt_ref: Option<String>,
        note: Option<String>,
        decided_by: &str,
    ) -> Result<TransactionId, Error> {
        if !fulfilled.is_positive() {
            return Err(Error::Validation(format!(
                "fulfilled amount must be positive, got {fulfilled}"
            )));
        }
        let (user_id, kind, purpose) = match self.store.request(request_id) {
            None => return Err(Error::NotFound(format!("no request with id {request_id}"))),
            Some(req) if !req.is_pending() => {
                return Err(Error::InvalidTransition(format!(
                    "request {} is already {:?}",
                    req.id, req.status
                )));
            }
            Some(req) => (req.user_id.clone(), req.kind, req.purpose.clone()),
        };
        let seq = self.store.next_seq();
        let signed = match kind {
            RequestKind::Withdrawal => -fulfilled,
            RequestKind::Deposit => fulfilled,
        };
        // Append before the request leaves Pending, so a failed append can
        // never strand a Fulfilled request without its transaction.
        let tx_id = self.store.append_transaction(Transaction {
            id: seq,
            created_at: seq,
            user_id,
            kind: kind.into(),
            amount: signed,
            status: TransactionStatus::Posted,
            memo: receipt_ref.unwrap_or(purpose),
            request_id: Some(request_id),
            entered_by: decided_by.to_owned(),
        })?;
        let request = self
            .store
            .request_mut(request_id)
            .ok_or_else(|| Error::Storage(format!("request {request_id} vanished mid-decision")))?;
        request.fulfill(fulfilled, decided_by, seq, note)?;
        tracing::info!(request = request_id, %fulfilled, by = decided_by, "fulfilled request");
        Ok(tx_id)
    }

    /// Direct fund movement on the principal's own goal account. Both
    /// actions credit the goal with twice the amount (1:1 bank match);
    /// transfers additionally debit the primary balance.
    pub fn apply_goal_action(
        &mut self,
        principal: &Principal,
        action: GoalAction,
        amount: Money,
    ) -> Result<GoalSnapshot, Error> {
        if !amount.is_positive() {
            return Err(Error::Validation(format!(
                "amount must be positive, got {amount}"
            )));
        }
        let seq = self.store.next_seq();
        let account = self
            .store
            .goal_account_mut(&principal.user_id)
            .ok_or_else(|| {
                Error::NotFound(format!("no goal account for {}", principal.user_id))
            })?;
        if action == GoalAction::Transfer {
            if account.primary < amount {
                return Err(Error::InsufficientFunds {
                    available: account.primary,
                    requested: amount,
                });
            }
            account.primary -= amount;
        }
        let matched = amount;
        let credited = amount + matched;
        account.goal += credited;
        let record = GoalActionRecord {
            seq,
            user_id: account.user_id.clone(),
            action,
            amount,
            matched,
            credited,
            primary_after: account.primary,
            goal_after: account.goal,
        };
        let snapshot = account.snapshot();
        self.store.append_goal_action(record);
        tracing::info!(user = %snapshot.user_id, ?action, %amount, %credited, "applied goal action");
        Ok(snapshot)
    }

    pub fn list_pending(
        &self,
        principal: &Principal,
        scope: PendingScope,
    ) -> Result<Vec<Request>, Error> {
        if scope == PendingScope::All {
            require_admin(principal, "listing all pending requests")?;
        }
        Ok(self
            .store
            .requests()
            .iter()
            .filter(|req| req.is_pending())
            .filter(|req| {
                scope == PendingScope::All
                    || req.user_id.eq_ignore_ascii_case(&principal.user_id)
            })
            .cloned()
            .collect())
    }

    pub fn list_balances(&self, principal: &Principal) -> Result<BalanceSheet, Error> {
        require_admin(principal, "listing balances")?;
        let mut ledger: Vec<(String, Money)> = Vec::new();
        for tx in self.store.transactions() {
            if !tx.counts_toward_balance() {
                continue;
            }
            match ledger
                .iter_mut()
                .find(|(user, _)| user.eq_ignore_ascii_case(&tx.user_id))
            {
                Some((_, total)) => *total += tx.amount,
                None => ledger.push((tx.user_id.clone(), tx.amount)),
            }
        }
        ledger.sort_by(|(a, _), (b, _)| a.cmp(b));
        let goals = self
            .store
            .goal_accounts()
            .map(|account| account.snapshot())
            .collect();
        Ok(BalanceSheet { ledger, goals })
    }
}

fn require_admin(principal: &Principal, operation: &str) -> Result<(), Error> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(Error::Authorization(format!(
            "{operation} requires an administrator role, {} has none",
            principal.user_id
        )))
    }
}
