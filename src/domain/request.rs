use crate::domain::{Error, Money};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Withdrawal,
    Deposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Fulfilled,
    Denied,
}

/// Visibility of a pending-request listing: a caller's own requests, or the
/// whole queue (administrators only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingScope {
    Mine,
    All,
}

/// A proposed withdrawal or deposit awaiting a decision. Transitions out of
/// `Pending` happen exactly once; the terminal states are final.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: RequestId,
    pub created_at: u64,
    pub user_id: String,
    pub kind: RequestKind,
    /// Originally requested amount; the granted amount may differ.
    pub amount: Money,
    pub purpose: String,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub status: RequestStatus,
    pub decided_at: Option<u64>,
    pub decided_by: Option<String>,
    pub fulfilled_amount: Option<Money>,
    pub admin_note: Option<String>,
}

impl Request {
    pub fn new(
        id: RequestId,
        created_at: u64,
        user_id: String,
        kind: RequestKind,
        amount: Money,
        purpose: String,
        link: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id,
            created_at,
            user_id,
            kind,
            amount,
            purpose,
            link,
            notes,
            status: RequestStatus::Pending,
            decided_at: None,
            decided_by: None,
            fulfilled_amount: None,
            admin_note: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn fulfill(
        &mut self,
        fulfilled_amount: Money,
        decided_by: &str,
        decided_at: u64,
        note: Option<String>,
    ) -> Result<(), Error> {
        self.ensure_pending()?;
        self.status = RequestStatus::Fulfilled;
        self.fulfilled_amount = Some(fulfilled_amount);
        self.decided_by = Some(decided_by.to_owned());
        self.decided_at = Some(decided_at);
        self.admin_note = note;
        Ok(())
    }

    pub fn deny(
        &mut self,
        decided_by: &str,
        decided_at: u64,
        note: Option<String>,
    ) -> Result<(), Error> {
        self.ensure_pending()?;
        self.status = RequestStatus::Denied;
        self.decided_by = Some(decided_by.to_owned());
        self.decided_at = Some(decided_at);
        self.admin_note = note;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), Error> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(Error::InvalidTransition(format!(
                "request {} is already {:?}",
                self.id, self.status
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Request, RequestKind, RequestStatus};
    use crate::domain::{Error, Money};

    fn pending() -> Request {
        Request::new(
            1,
            1,
            "kid1".to_owned(),
            RequestKind::Withdrawal,
            Money(1500),
            "book".to_owned(),
            None,
            None,
        )
    }

    #[test]
    fn fulfill_transitions_exactly_once() {
        let mut req = pending();
        req.fulfill(Money(1200), "parent", 2, None).unwrap();
        assert_eq!(req.status, RequestStatus::Fulfilled);
        assert_eq!(req.fulfilled_amount, Some(Money(1200)));
        assert_eq!(req.decided_by.as_deref(), Some("parent"));

        let err = req.fulfill(Money(1200), "parent", 3, None).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
        let err = req.deny("parent", 3, None).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition(_)));
    }

    #[test]
    fn deny_records_decision_without_amount() {
        let mut req = pending();
        req.deny("parent", 2, Some("not this month".to_owned()))
            .unwrap();
        assert_eq!(req.status, RequestStatus::Denied);
        assert_eq!(req.fulfilled_amount, None);
        assert_eq!(req.admin_note.as_deref(), Some("not this month"));

        assert!(req.fulfill(Money(100), "parent", 3, None).is_err());
    }
}
