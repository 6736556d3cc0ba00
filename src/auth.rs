use std::sync::RwLock;

use async_trait::async_trait;

/// Hands out the bearer token of the identity provider's current session.
///
/// Sign-in itself happens in the hosted identity provider; this crate only
/// needs the resulting access token to attach to backend calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// `None` when there is no signed-in session.
    async fn access_token(&self) -> Option<String>;
}

/// A token held in memory, replaced on sign-in and cleared on sign-out.
#[derive(Default)]
pub struct SessionToken {
    token: RwLock<Option<String>>,
}

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[async_trait]
impl TokenSource for SessionToken {
    async fn access_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(|t| !t.is_empty())
    }
}
