//! Live watch settings shared between the scheduler and the control surface.
//!
//! Each field sits behind its own lock; there is no cross-field atomicity.
//! A refresh cycle works from a [`WatchSnapshot`] taken when the cycle
//! starts, so edits land on the next cycle, never a running one.

use std::sync::RwLock;

use crate::config::WatchDefaults;
use crate::{Error, Result};

/// Immutable copy of the watch settings at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSnapshot {
    pub keywords: Vec<String>,
    pub prompt: String,
    pub refresh_interval_secs: u64,
}

/// Mutable watch settings with validated, per-field access.
pub struct WatchStore {
    keywords: RwLock<Vec<String>>,
    prompt: RwLock<String>,
    refresh_interval_secs: RwLock<u64>,
}

impl WatchStore {
    pub fn new(defaults: WatchDefaults) -> Self {
        Self {
            keywords: RwLock::new(defaults.keywords),
            prompt: RwLock::new(defaults.prompt),
            refresh_interval_secs: RwLock::new(defaults.refresh_interval_secs.max(1)),
        }
    }

    /// Copy all three fields. Fields are read one at a time; a concurrent
    /// single-field edit may land between reads, which is acceptable since
    /// the fields are independent.
    pub fn snapshot(&self) -> WatchSnapshot {
        WatchSnapshot {
            keywords: self.keywords.read().unwrap().clone(),
            prompt: self.prompt.read().unwrap().clone(),
            refresh_interval_secs: *self.refresh_interval_secs.read().unwrap(),
        }
    }

    /// Replace the keyword list. Entries are trimmed; an empty list or a
    /// blank entry is rejected and the prior list is kept.
    pub fn set_keywords(&self, keywords: Vec<String>) -> Result<()> {
        if keywords.is_empty() {
            return Err(Error::Validation("keyword list must not be empty".into()));
        }

        let mut cleaned = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let trimmed = keyword.trim();
            if trimmed.is_empty() {
                return Err(Error::Validation("keywords must not be blank".into()));
            }
            cleaned.push(trimmed.to_string());
        }

        *self.keywords.write().unwrap() = cleaned;
        Ok(())
    }

    pub fn set_prompt(&self, prompt: String) -> Result<()> {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("prompt must not be blank".into()));
        }

        *self.prompt.write().unwrap() = trimmed.to_string();
        Ok(())
    }

    /// Update the refresh cadence. Takes effect at the next countdown
    /// reset, i.e. the next cycle start.
    pub fn set_refresh_interval(&self, secs: i64) -> Result<()> {
        if secs <= 0 {
            return Err(Error::Validation(format!(
                "refresh interval must be a positive number of seconds, got {}",
                secs
            )));
        }

        *self.refresh_interval_secs.write().unwrap() = secs as u64;
        Ok(())
    }

    pub fn keywords(&self) -> Vec<String> {
        self.keywords.read().unwrap().clone()
    }

    pub fn refresh_interval_secs(&self) -> u64 {
        *self.refresh_interval_secs.read().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> WatchStore {
        WatchStore::new(WatchDefaults {
            keywords: vec!["stocks".into()],
            prompt: "Summarize this.".into(),
            refresh_interval_secs: 300,
        })
    }

    #[test]
    fn snapshot_is_isolated_from_later_edits() {
        let store = store();
        store
            .set_keywords(vec!["a".into(), "b".into()])
            .unwrap();

        let snapshot = store.snapshot();
        store.set_keywords(vec!["c".into()]).unwrap();

        assert_eq!(snapshot.keywords, vec!["a", "b"]);
        assert_eq!(store.snapshot().keywords, vec!["c"]);
    }

    #[test]
    fn rejects_empty_keyword_list() {
        let store = store();
        let err = store.set_keywords(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.keywords(), vec!["stocks"]);
    }

    #[test]
    fn rejects_blank_keyword_entry() {
        let store = store();
        let err = store
            .set_keywords(vec!["acme".into(), "   ".into()])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.keywords(), vec!["stocks"]);
    }

    #[test]
    fn trims_keyword_entries() {
        let store = store();
        store
            .set_keywords(vec!["  acme ".into(), "merger".into()])
            .unwrap();
        assert_eq!(store.keywords(), vec!["acme", "merger"]);
    }

    #[test]
    fn rejects_blank_prompt() {
        let store = store();
        let err = store.set_prompt("   ".into()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.snapshot().prompt, "Summarize this.");
    }

    #[test]
    fn rejects_non_positive_intervals() {
        let store = store();

        assert!(matches!(
            store.set_refresh_interval(0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.set_refresh_interval(-5),
            Err(Error::Validation(_))
        ));
        assert_eq!(store.refresh_interval_secs(), 300);

        store.set_refresh_interval(60).unwrap();
        assert_eq!(store.refresh_interval_secs(), 60);
    }
}
