//! Delivery history used to suppress repeat notifications.
//!
//! An article's identity is the pair of its produced summary text and its
//! link; both must have been delivered before for the article to count as
//! a duplicate. Entries are never evicted for the life of the process.

use std::collections::HashSet;
use std::sync::Mutex;

pub struct DeliveryLog {
    delivered: Mutex<HashSet<(String, String)>>,
}

impl DeliveryLog {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(HashSet::new()),
        }
    }

    /// Record the pair unless it was already delivered. The check and the
    /// insert happen under one lock, so of any number of concurrent calls
    /// with the same pair exactly one returns true.
    pub fn record_if_new(&self, summary: &str, link: &str) -> bool {
        let mut delivered = self.delivered.lock().unwrap();
        delivered.insert((summary.to_string(), link.to_string()))
    }

    pub fn has_seen(&self, summary: &str, link: &str) -> bool {
        let delivered = self.delivered.lock().unwrap();
        delivered.contains(&(summary.to_string(), link.to_string()))
    }

    pub fn len(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeliveryLog {
    fn default() -> Self {
        Self::new()
    }
}
