use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::{ConversationLog, LogEntry};

/// Idle time after which a session log is dropped (two weeks).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);
/// Upper bound on live session logs; the least recently used one goes first.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Slot {
    log: ConversationLog,
    touched: Instant,
}

/// Per-browser conversation logs, keyed by session id.
///
/// Logs expire after `ttl` without a new exchange, and the store never holds
/// more than `max_sessions` of them.
pub struct SessionStore {
    logs: RwLock<HashMap<String, Slot>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Appends a completed exchange. Both entries are written under one lock
    /// so concurrent requests never interleave a pair.
    pub async fn record_exchange(&self, session_id: &str, message: &str, reply: &str) {
        let mut logs = self.logs.write().await;
        let ttl = self.ttl;
        logs.retain(|_, slot| slot.touched.elapsed() < ttl);

        if !logs.contains_key(session_id) && logs.len() >= self.max_sessions {
            let oldest = logs
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                debug!("Evicting web session {oldest}");
                logs.remove(&oldest);
            }
        }

        let slot = logs.entry(session_id.to_string()).or_insert_with(|| Slot {
            log: ConversationLog::new(),
            touched: Instant::now(),
        });
        slot.log.push_user(message);
        slot.log.push_model(reply);
        slot.touched = Instant::now();
    }

    pub async fn entries(&self, session_id: &str) -> Vec<LogEntry> {
        self.logs
            .read()
            .await
            .get(session_id)
            .filter(|slot| slot.touched.elapsed() < self.ttl)
            .map(|slot| slot.log.entries().to_vec())
            .unwrap_or_default()
    }

    /// Explicit reset; returns what was cleared.
    pub async fn clear(&self, session_id: &str) -> Vec<LogEntry> {
        self.logs
            .write()
            .await
            .remove(session_id)
            .filter(|slot| slot.touched.elapsed() < self.ttl)
            .map(|mut slot| slot.log.clear())
            .unwrap_or_default()
    }

    pub async fn session_count(&self) -> usize {
        self.logs.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new();
        store.record_exchange("a", "hi", "hello").await;

        assert_eq!(store.entries("a").await.len(), 2);
        assert!(store.entries("b").await.is_empty());
    }

    #[tokio::test]
    async fn clear_returns_entries_once() {
        let store = SessionStore::new();
        store.record_exchange("a", "hi", "hello").await;

        assert_eq!(store.clear("a").await.len(), 2);
        assert!(store.clear("a").await.is_empty());
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn least_recently_used_session_is_evicted_at_capacity() {
        let store = SessionStore::with_limits(DEFAULT_SESSION_TTL, 2);
        store.record_exchange("a", "1", "one").await;
        store.record_exchange("b", "2", "two").await;
        store.record_exchange("a", "3", "three").await;

        store.record_exchange("c", "4", "four").await;

        assert_eq!(store.session_count().await, 2);
        assert!(store.entries("b").await.is_empty());
        assert_eq!(store.entries("a").await.len(), 4);
        assert_eq!(store.entries("c").await.len(), 2);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::with_limits(Duration::from_millis(20), 100);
        store.record_exchange("stale", "hi", "hello").await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(store.entries("stale").await.is_empty());
        store.record_exchange("fresh", "hi", "hello").await;
        assert_eq!(store.session_count().await, 1);
        assert_eq!(store.entries("fresh").await.len(), 2);
    }
}
