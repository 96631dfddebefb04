//! Bounded per-subject cache of successful token verifications.

use std::collections::HashMap;

use dashmap::DashMap;

/// One cached verification, as seen by a sweep snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedVerification {
    /// Subject the token was verified against.
    pub subject: String,
    /// The token string.
    pub token: String,
    /// Effective expiry (seconds since epoch, leeway included).
    pub expires_at: i64,
}

/// Successful verifications keyed by subject, then by token.
///
/// Only valid results are stored. Each entry remembers the instant its token
/// stops being valid, so a lookup after that instant is a miss even before
/// the next sweep runs.
#[derive(Debug)]
pub struct VerificationCache {
    entries: DashMap<String, HashMap<String, i64>>,
    max_per_subject: usize,
}

impl VerificationCache {
    /// Creates an empty cache holding at most `max_per_subject` tokens per subject.
    pub fn new(max_per_subject: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_per_subject: max_per_subject.max(1),
        }
    }

    /// Whether `(subject, token)` holds a verification still valid at `now`.
    pub fn lookup(&self, subject: &str, token: &str, now: i64) -> bool {
        self.entries
            .get(subject)
            .and_then(|tokens| tokens.get(token).copied())
            .is_some_and(|expires_at| now < expires_at)
    }

    /// Records a successful verification.
    ///
    /// When the subject already holds the maximum number of tokens, one
    /// arbitrary entry is evicted first.
    pub fn insert(&self, subject: &str, token: &str, expires_at: i64) {
        let mut tokens = self.entries.entry(subject.to_string()).or_default();
        if !tokens.contains_key(token) && tokens.len() >= self.max_per_subject {
            let evicted = tokens.keys().next().cloned();
            if let Some(evicted) = evicted {
                tokens.remove(&evicted);
            }
        }
        tokens.insert(token.to_string(), expires_at);
    }

    /// Number of cached tokens for one subject.
    pub fn subject_len(&self, subject: &str) -> usize {
        self.entries.get(subject).map_or(0, |tokens| tokens.len())
    }

    /// Total number of cached tokens.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Copies the current contents.
    pub fn snapshot(&self) -> Vec<CachedVerification> {
        self.entries
            .iter()
            .flat_map(|entry| {
                let subject = entry.key().clone();
                entry
                    .value()
                    .iter()
                    .map(|(token, expires_at)| CachedVerification {
                        subject: subject.clone(),
                        token: token.clone(),
                        expires_at: *expires_at,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Removes entries that are stale at `now` and subjects left empty.
    ///
    /// An entry replaced between the snapshot and the removal is kept.
    /// Returns the number of entries removed.
    pub fn sweep(&self, now: i64) -> usize {
        let stale = select_stale(&self.snapshot(), now);
        let mut removed = 0;

        for entry in &stale {
            if let Some(mut tokens) = self.entries.get_mut(&entry.subject) {
                if tokens.get(&entry.token) == Some(&entry.expires_at) {
                    tokens.remove(&entry.token);
                    removed += 1;
                }
            }
            self.entries
                .remove_if(&entry.subject, |_, tokens| tokens.is_empty());
        }

        removed
    }
}

/// Selects the entries whose token is no longer valid at `now`.
pub fn select_stale(snapshot: &[CachedVerification], now: i64) -> Vec<CachedVerification> {
    snapshot
        .iter()
        .filter(|entry| entry.expires_at <= now)
        .cloned()
        .collect()
}
