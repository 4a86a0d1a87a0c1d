#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Requester,
}

/// Authenticated identity under which an operation executes. Produced by the
/// access gate; the core never sees credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Identity attributed to auto-posted decisions.
pub const SYSTEM_DECIDER: &str = "system";

#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub issued_at: u64,
}
