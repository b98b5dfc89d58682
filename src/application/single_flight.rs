//! Single-flight registry - Collapses concurrent computations per key.
//!
//! The first caller for a key becomes the leader and computes; callers that
//! arrive while it is in flight follow and receive the leader's value over a
//! `watch` channel. Followers wait at most a bounded time. A leader that
//! fails or is dropped without completing releases its followers with no
//! value, and they compute on their own.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;

/// Registry of in-flight computations keyed by `K`.
#[derive(Debug)]
pub struct SingleFlight<K, V> {
    in_flight: Mutex<HashMap<K, watch::Receiver<Option<V>>>>,
}

/// Outcome of joining a key.
pub enum Flight<'a, K: Eq + Hash + Clone, V: Clone> {
    /// No computation was running; the caller must compute and complete.
    Leader(LeaderGuard<'a, K, V>),
    /// Another caller is computing.
    Follower(Follower<V>),
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> SingleFlight<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `key`.
    pub fn join(&self, key: K) -> Flight<'_, K, V> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(receiver) = in_flight.get(&key) {
            return Flight::Follower(Follower {
                receiver: receiver.clone(),
            });
        }

        let (sender, receiver) = watch::channel(None);
        in_flight.insert(key.clone(), receiver);
        Flight::Leader(LeaderGuard {
            registry: self,
            key,
            sender,
        })
    }

    /// Number of keys currently being computed.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    fn release(&self, key: &K) {
        self.in_flight
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .remove(key);
    }
}

/// Held by the computing caller. Dropping it unregisters the key.
pub struct LeaderGuard<'a, K: Eq + Hash + Clone, V: Clone> {
    registry: &'a SingleFlight<K, V>,
    key: K,
    sender: watch::Sender<Option<V>>,
}

impl<K: Eq + Hash + Clone, V: Clone> LeaderGuard<'_, K, V> {
    /// Hands `value` to every follower and unregisters the key.
    pub fn complete(self, value: V) {
        // Followers may all have timed out already.
        let _ = self.sender.send(Some(value));
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Drop for LeaderGuard<'_, K, V> {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

/// Waiting side of an in-flight computation.
pub struct Follower<V> {
    receiver: watch::Receiver<Option<V>>,
}

impl<V: Clone> Follower<V> {
    /// The leader's value, or `None` if the leader gave up or `timeout`
    /// elapsed first.
    pub async fn wait(mut self, timeout: Duration) -> Option<V> {
        let outcome = tokio::time::timeout(timeout, async {
            loop {
                let current = self.receiver.borrow_and_update().clone();
                if current.is_some() {
                    return current;
                }
                if self.receiver.changed().await.is_err() {
                    return self.receiver.borrow().clone();
                }
            }
        })
        .await;

        outcome.unwrap_or(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader<'a>(flight: Flight<'a, &'static str, u32>) -> LeaderGuard<'a, &'static str, u32> {
        match flight {
            Flight::Leader(guard) => guard,
            Flight::Follower(_) => panic!("expected leader"),
        }
    }

    fn follower(flight: Flight<'_, &'static str, u32>) -> Follower<u32> {
        match flight {
            Flight::Follower(f) => f,
            Flight::Leader(_) => panic!("expected follower"),
        }
    }

    #[test]
    fn first_caller_leads_and_second_follows() {
        let registry = SingleFlight::new();
        let _guard = leader(registry.join("a"));
        let _f = follower(registry.join("a"));
        assert_eq!(registry.in_flight(), 1);
    }

    #[test]
    fn distinct_keys_do_not_coordinate() {
        let registry = SingleFlight::new();
        let _a = leader(registry.join("a"));
        let _b = leader(registry.join("b"));
        assert_eq!(registry.in_flight(), 2);
    }

    #[tokio::test]
    async fn followers_receive_the_leaders_value() {
        let registry = SingleFlight::<&'static str, u32>::new();

        let guard = leader(registry.join("a"));
        let waiting = follower(registry.join("a"));
        let handle = tokio::spawn(waiting.wait(Duration::from_secs(1)));
        guard.complete(42);

        assert_eq!(handle.await.unwrap(), Some(42));
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn dropped_leader_releases_followers_without_value() {
        let registry = SingleFlight::<&'static str, u32>::new();
        let guard = leader(registry.join("a"));
        let waiting = follower(registry.join("a"));

        drop(guard);

        assert_eq!(waiting.wait(Duration::from_secs(1)).await, None);
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn follower_wait_is_bounded() {
        let registry = SingleFlight::<&'static str, u32>::new();
        let _guard = leader(registry.join("a"));
        let waiting = follower(registry.join("a"));

        assert_eq!(waiting.wait(Duration::from_millis(20)).await, None);
    }

    #[test]
    fn key_is_free_again_after_completion() {
        let registry = SingleFlight::<&'static str, u32>::new();
        leader(registry.join("a")).complete(1);
        let _next = leader(registry.join("a"));
    }
}
