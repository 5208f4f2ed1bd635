use std::collections::HashSet;
use std::sync::Mutex;

/// Cumulative set of user ids seen since process start.
///
/// The set only grows: a user who disconnects stays counted. Memory use is
/// therefore proportional to the number of distinct user ids ever reported,
/// and nothing evicts them short of a restart.
pub struct UniqueUserTracker {
    seen: Mutex<HashSet<String>>,
}

impl std::fmt::Debug for UniqueUserTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniqueUserTracker")
            .field("count", &self.count())
            .finish()
    }
}

impl UniqueUserTracker {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Records `user_id`, returning `true` if it had never been seen before.
    ///
    /// Check and insert happen under one lock so concurrent scrapes cannot
    /// double count.
    pub fn observe(&self, user_id: &str) -> bool {
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("UniqueUserTracker: Lock poisoned, recovering");
                poisoned.into_inner()
            }
        };

        if seen.contains(user_id) {
            return false;
        }
        seen.insert(user_id.to_string())
    }

    /// Number of distinct users observed so far.
    pub fn count(&self) -> usize {
        match self.seen.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Default for UniqueUserTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_observe_reports_first_sighting_only() {
        let tracker = UniqueUserTracker::new();
        assert_eq!(tracker.count(), 0);

        assert!(tracker.observe("alice"));
        assert!(!tracker.observe("alice"));
        assert!(tracker.observe("bob"));
        assert_eq!(tracker.count(), 2);
    }

    #[test]
    fn test_empty_user_id_is_a_user() {
        let tracker = UniqueUserTracker::new();
        assert!(tracker.observe(""));
        assert!(!tracker.observe(""));
        assert_eq!(tracker.count(), 1);
    }

    #[test]
    fn test_concurrent_observers_count_each_user_once() {
        let tracker = Arc::new(UniqueUserTracker::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    (0..100)
                        .filter(|i| tracker.observe(&format!("user-{i}")))
                        .count()
                })
            })
            .collect();

        let new_users: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(new_users, 100);
        assert_eq!(tracker.count(), 100);
    }
}
