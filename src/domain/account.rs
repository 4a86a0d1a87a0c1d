use crate::domain::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalAction {
    Deposit,
    Transfer,
}

/// Account with a spendable primary balance and a matched savings-goal
/// balance. Balances only change through goal actions.
#[derive(Debug, Clone)]
pub struct GoalAccount {
    pub user_id: String,
    pub primary: Money,
    pub goal: Money,
    pub target: Money,
}

impl GoalAccount {
    pub fn new(user_id: String, primary: Money, target: Money) -> Self {
        Self {
            user_id,
            primary,
            goal: Money::zero(),
            target,
        }
    }

    pub fn snapshot(&self) -> GoalSnapshot {
        GoalSnapshot {
            user_id: self.user_id.clone(),
            primary: self.primary,
            goal: self.goal,
            target: self.target,
        }
    }
}

/// Immutable log entry for one goal action. `credited == amount + matched`
/// and `matched == amount` (1:1 match).
#[derive(Debug, Clone)]
pub struct GoalActionRecord {
    pub seq: u64,
    pub user_id: String,
    pub action: GoalAction,
    pub amount: Money,
    pub matched: Money,
    pub credited: Money,
    pub primary_after: Money,
    pub goal_after: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalSnapshot {
    pub user_id: String,
    pub primary: Money,
    pub goal: Money,
    pub target: Money,
}
