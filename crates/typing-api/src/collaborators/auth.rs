//! Static token authenticator

use async_trait::async_trait;
use dashmap::DashMap;
use typing_common::SeedToken;

use super::{Authenticator, Requester};

/// Authenticator over a fixed set of access tokens
///
/// Tokens can be added at runtime; lookups never block writers for long.
#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    tokens: DashMap<String, Requester>,
}

impl StaticTokenAuthenticator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from seeded `token=@user` entries
    pub fn from_seed(seed: &[SeedToken]) -> Self {
        let auth = Self::new();
        for entry in seed {
            let requester = if entry.is_guest {
                Requester::guest(entry.user_id.clone())
            } else {
                Requester::new(entry.user_id.clone())
            };
            auth.insert(entry.token.clone(), requester);
        }
        auth
    }

    /// Register or replace a token
    pub fn insert(&self, token: impl Into<String>, requester: Requester) {
        let token = token.into();
        tracing::debug!(user_id = %requester.user_id, is_guest = requester.is_guest, "Token registered");
        self.tokens.insert(token, requester);
    }

    /// Forget a token; returns whether it existed
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> Option<Requester> {
        self.tokens.get(token).map(|entry| entry.value().clone())
    }
}
