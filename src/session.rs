use std::collections::HashMap;

use crate::domain::{AccessGate, Error, Principal, Session};

/// Token table with a logical clock. Sessions expire after `ttl` ticks when
/// a TTL is configured; unknown and expired tokens both fail authorization.
#[derive(Default, Debug)]
pub struct StaticGate {
    sessions: HashMap<String, Session>,
    now: u64,
    ttl: Option<u64>,
}

impl StaticGate {
    pub fn new(ttl: Option<u64>) -> Self {
        Self {
            sessions: HashMap::new(),
            now: 0,
            ttl,
        }
    }

    pub fn issue(&mut self, token: impl Into<String>, principal: Principal) {
        let token = token.into();
        tracing::debug!(user = %principal.user_id, "issued session");
        self.sessions.insert(
            token,
            Session {
                principal,
                issued_at: self.now,
            },
        );
    }

    pub fn advance(&mut self, ticks: u64) {
        self.now += ticks;
    }
}

impl AccessGate for StaticGate {
    fn authenticate(&self, token: &str) -> Result<Principal, Error> {
        let session = self
            .sessions
            .get(token)
            .ok_or_else(|| Error::Authorization("no session for token".into()))?;
        if let Some(ttl) = self.ttl {
            if self.now.saturating_sub(session.issued_at) > ttl {
                return Err(Error::Authorization(format!(
                    "session for {} expired",
                    session.principal.user_id
                )));
            }
        }
        Ok(session.principal.clone())
    }
}
