use std::collections::HashMap;
use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::RngCore;

use super::domain::AuthSession;
use crate::workflows::vendors::Watchlist;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct SessionEntry {
    session: AuthSession,
    watchlist: Watchlist,
}

/// Opaque bearer tokens mapped to an authenticated identity and the
/// watchlist that identity builds up while signed in.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, session: AuthSession) -> String {
        let token = generate_token();
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.insert(
            token.clone(),
            SessionEntry {
                session,
                watchlist: Watchlist::new(),
            },
        );
        token
    }

    pub fn resolve(&self, token: &str) -> Option<AuthSession> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        guard.get(token).map(|entry| entry.session.clone())
    }

    /// Returns `false` when the token was unknown.
    pub fn revoke(&self, token: &str) -> bool {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.remove(token).is_some()
    }

    pub fn watchlist(&self, token: &str) -> Option<Watchlist> {
        let guard = self.sessions.lock().expect("session mutex poisoned");
        guard.get(token).map(|entry| entry.watchlist.clone())
    }

    /// Apply `change` to the session's watchlist; `None` for unknown tokens.
    pub fn update_watchlist<T>(
        &self,
        token: &str,
        change: impl FnOnce(&mut Watchlist) -> T,
    ) -> Option<T> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard
            .get_mut(token)
            .map(|entry| change(&mut entry.watchlist))
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
