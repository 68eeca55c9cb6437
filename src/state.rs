use crate::clock::Clock;
use crate::session::SessionStore;
use crate::storage::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: SessionStore,
    pub clock: Clock,
}

impl AppState {
    pub fn new(store: Store, clock: Clock) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            clock,
        }
    }
}
