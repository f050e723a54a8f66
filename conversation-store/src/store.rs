use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::{Rng, distr::Alphanumeric};
use tracing::debug;

/// Age after which an entry is removed by the next sweep.
pub const EXPIRATION_WINDOW: Duration = Duration::from_secs(3 * 60 * 60);

/// Length of generated conversation codes.
pub const CODE_LEN: usize = 3;

/// Last answer stored under one code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConversationEntry {
    last_touched: DateTime<Utc>,
    content: String,
}

impl ConversationEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        // Negative ages (clock moved backwards) never expire.
        now.signed_duration_since(self.last_touched)
            .to_std()
            .is_ok_and(|age| age > EXPIRATION_WINDOW)
    }
}

/// In-memory `code -> entry` map guarded by one coarse lock.
///
/// Expiry is only enforced by [`sweep`](Self::sweep): an expired entry that has
/// not been swept yet is still returned by [`get`](Self::get). There is no size
/// bound between sweeps.
#[derive(Debug, Default)]
pub struct ConversationStore {
    entries: Mutex<HashMap<String, ConversationEntry>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored content for `code`, if any.
    pub fn get(&self, code: &str) -> Option<String> {
        self.entries.lock().get(code).map(|e| e.content.clone())
    }

    /// Inserts or replaces `code`, stamping it with the current time.
    pub fn put(&self, code: impl Into<String>, content: impl Into<String>) {
        self.put_at(code, content, Utc::now());
    }

    /// Inserts or replaces `code` with an explicit timestamp.
    pub fn put_at(&self, code: impl Into<String>, content: impl Into<String>, at: DateTime<Utc>) {
        let entry = ConversationEntry {
            last_touched: at,
            content: content.into(),
        };
        self.entries.lock().insert(code.into(), entry);
    }

    /// Fresh random alphanumeric code of [`CODE_LEN`] characters.
    ///
    /// Not checked against live entries: a collision overwrites the older
    /// conversation. With 62^3 codes and a three-hour window this is accepted.
    pub fn generate_code(&self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(CODE_LEN)
            .map(char::from)
            .collect()
    }

    /// Removes every entry older than [`EXPIRATION_WINDOW`]. Returns the number removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    /// [`sweep`](Self::sweep) against an explicit clock reading.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let removed = before - entries.len();
        debug!(removed, remaining = entries.len(), "conversation sweep");
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn get_on_unknown_code_is_none() {
        let store = ConversationStore::new();
        assert_eq!(store.get("abc"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn put_overwrites_and_refreshes() {
        let store = ConversationStore::new();
        let t0 = Utc::now() - TimeDelta::hours(2);
        store.put_at("abc", "first", t0);
        store.put("abc", "second");

        assert_eq!(store.get("abc").as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
        // Refreshed timestamp survives a sweep that would have caught t0 + 3h.
        assert_eq!(store.sweep_at(t0 + TimeDelta::hours(3) + TimeDelta::minutes(1)), 0);
    }

    #[test]
    fn sweep_respects_the_window() {
        let store = ConversationStore::new();
        let t0 = Utc::now();
        store.put_at("old", "x", t0);
        store.put_at("new", "y", t0 + TimeDelta::hours(1));

        assert_eq!(store.sweep_at(t0 + TimeDelta::hours(3) - TimeDelta::seconds(1)), 0);
        assert_eq!(store.get("old").as_deref(), Some("x"));

        assert_eq!(store.sweep_at(t0 + TimeDelta::hours(3) + TimeDelta::seconds(1)), 1);
        assert_eq!(store.get("old"), None);
        assert_eq!(store.get("new").as_deref(), Some("y"));
    }

    #[test]
    fn expired_entry_is_readable_until_swept() {
        let store = ConversationStore::new();
        store.put_at("abc", "stale", Utc::now() - TimeDelta::hours(5));
        assert_eq!(store.get("abc").as_deref(), Some("stale"));
        assert_eq!(store.sweep(), 1);
        assert_eq!(store.get("abc"), None);
    }

    #[test]
    fn generated_codes_are_short_alphanumeric() {
        let store = ConversationStore::new();
        for _ in 0..100 {
            let code = store.generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn concurrent_puts_keep_one_whole_value() {
        let store = Arc::new(ConversationStore::new());
        let x = "x".repeat(4096);
        let y = "y".repeat(4096);

        thread::scope(|s| {
            for i in 0..8 {
                let store = Arc::clone(&store);
                let value = if i % 2 == 0 { x.clone() } else { y.clone() };
                s.spawn(move || {
                    for _ in 0..200 {
                        store.put("abc", value.as_str());
                        store.sweep();
                    }
                });
            }
        });

        let got = store.get("abc").expect("key must survive");
        assert!(got == x || got == y);
        assert_eq!(store.len(), 1);
    }
}
