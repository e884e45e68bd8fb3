// ── Reactive home store ──
//
// Holds the current `HomeSnapshot` behind a `watch` channel. Writers always
// replace the whole snapshot; readers get a cheap `Arc` clone.

mod snapshot;

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::LightUpdate;

pub use snapshot::HomeSnapshot;

pub struct HomeStore {
    snapshot: watch::Sender<Arc<HomeSnapshot>>,
}

impl Default for HomeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(HomeSnapshot::default()));
        Self { snapshot }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn current(&self) -> Arc<HomeSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<HomeSnapshot>> {
        self.snapshot.subscribe()
    }

    /// Replace everything with a freshly fetched snapshot.
    pub fn replace(&self, snapshot: HomeSnapshot) {
        self.snapshot.send_replace(Arc::new(snapshot));
    }

    /// Speculatively apply `update` to the given lights.
    pub fn apply_optimistic(&self, ids: &[String], update: &LightUpdate) {
        self.snapshot.send_modify(|current| {
            *current = Arc::new(current.with_overlay(ids, update));
        });
    }

    pub fn clear(&self) {
        self.snapshot.send_replace(Arc::new(HomeSnapshot::default()));
    }
}
