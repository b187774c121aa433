// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session table: ephemeral token → account.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use mahmock_core::{AccountId, SessionToken};

/// Concurrent map of live session tokens.
///
/// Cloning shares the underlying table. Tokens are never reused across
/// connections, even for the same account.
#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    inner: Arc<DashMap<SessionToken, AccountId>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh token for `account` and record it.
    pub fn mint(&self, account: AccountId) -> SessionToken {
        loop {
            let token = SessionToken::generate();
            if let Entry::Vacant(slot) = self.inner.entry(token.clone()) {
                slot.insert(account);
                tracing::debug!(%account, "session minted");
                return token;
            }
        }
    }

    /// Whether `token` is a live session.
    pub fn contains(&self, token: &str) -> bool {
        self.inner.contains_key(token)
    }

    pub fn account_of(&self, token: &str) -> Option<AccountId> {
        self.inner.get(token).map(|entry| *entry.value())
    }

    /// Remove a session, returning the account it belonged to.
    pub fn remove(&self, token: &SessionToken) -> Option<AccountId> {
        self.inner.remove(token).map(|(_, account)| account)
    }

    /// Number of sessions held by `account`.
    pub fn count_for(&self, account: AccountId) -> usize {
        self.inner.iter().filter(|e| *e.value() == account).count()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
