use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::models::Story;

pub type DbPool = Pool<SqliteConnectionManager>;

type ChangeCallback = Box<dyn Fn(&[Story]) + Send + Sync>;

/// Subscribe-for-changes boundary over the story collection. Every accepted
/// mutation reloads the full approved collection and pushes the replacement
/// snapshot to subscribers (last notification wins); the generation counter
/// lets HTTP clients poll for staleness instead of holding a connection.
#[derive(Default)]
pub struct ChangeFeed {
    generation: AtomicU64,
    subscribers: RwLock<Vec<ChangeCallback>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&[Story]) + Send + Sync + 'static,
    {
        let mut subs = self.subscribers.write().unwrap_or_else(|poisoned| {
            log::error!("RwLock for change feed subscribers was poisoned! Recovering lock.");
            poisoned.into_inner()
        });
        subs.push(Box::new(callback));
    }

    /// Bumps the generation and hands every subscriber the refreshed
    /// collection. Returns the new generation.
    pub fn notify(&self, stories: &[Story]) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let subs = self.subscribers.read().unwrap_or_else(|poisoned| {
            log::error!("RwLock for change feed subscribers was poisoned! Using stale data.");
            poisoned.into_inner()
        });
        for callback in subs.iter() {
            callback(stories);
        }
        generation
    }
}

pub struct AppState {
    /// Last-known-good approved story collection, served when the content
    /// store read fails.
    pub story_cache: RwLock<Vec<Story>>,
    pub change_feed: ChangeFeed,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            story_cache: RwLock::new(Vec::new()),
            change_feed: ChangeFeed::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub mod config;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;
