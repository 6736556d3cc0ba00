//! Client-side caches of backend data.
//!
//! Each [`Store`] wraps plain state behind a lock and bumps a change counter
//! on every [`Store::update`], so views can `subscribe` and re-render instead
//! of re-reading getters after each mutation. Stores are owned by an
//! [`AppState`] that is handed to whoever needs it; there are no globals.
//! Nothing here is persisted: a restart loses anything not yet sent to the
//! backend.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;

pub mod posts_store;
pub mod user_store;

pub use posts_store::PostsState;
pub use user_store::UserState;

pub struct Store<S> {
    state: RwLock<S>,
    changes: watch::Sender<u64>,
}

impl<S: Default> Default for Store<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Store<S> {
    pub fn new(state: S) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            state: RwLock::new(state),
            changes,
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Applies `f` and notifies subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = {
            let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
            f(&mut guard)
        };
        self.changes.send_modify(|version| *version += 1);
        result
    }

    /// A receiver that is marked changed after every [`Store::update`].
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn version(&self) -> u64 {
        *self.changes.borrow()
    }
}

impl<S: Clone> Store<S> {
    pub fn snapshot(&self) -> S {
        self.read(S::clone)
    }
}

/// Everything the client caches for the signed-in user.
#[derive(Default)]
pub struct AppState {
    pub user: Store<UserState>,
    pub posts: Store<PostsState>,
}

impl AppState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drops all cached data; used on logout and account deletion.
    pub fn reset(&self) {
        self.user.update(UserState::delete_user);
        self.posts.update(PostsState::clear_all);
    }
}
