// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Notification topics.
//!
//! An [`Observable`] keeps the last published value and calls every
//! registered listener synchronously on the publishing thread. Tests and
//! applications block on [`Observable::wait_for`] until a value matching
//! a predicate shows up.
//!
//! # Example
//! ```
//! use protosdc::consumer::Observable;
//! use std::time::Duration;
//!
//! let topic: Observable<u32> = Observable::new();
//! topic.publish(3);
//! assert_eq!(topic.wait_for(|v| *v == 3, Duration::from_millis(10)), Some(3));
//! ```

use crossbeam::channel;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Identifies a registered listener.
pub type ListenerId = u64;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Typed topic with latest value, listeners and predicate waits.
pub struct Observable<T> {
    latest: Mutex<Option<T>>,
    listeners: RwLock<Vec<(ListenerId, Listener<T>)>>,
    next_id: AtomicU64,
    published: AtomicU64,
}

impl<T: Clone + Send + 'static> Observable<T> {
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(None),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            published: AtomicU64::new(0),
        }
    }

    /// Store `value` and deliver it to every listener.
    ///
    /// Listeners run after the value lock is released; a listener may
    /// read the topic but must not block on another publish of it.
    pub fn publish(&self, value: T) {
        *self.latest.lock() = Some(value.clone());
        self.published.fetch_add(1, Ordering::AcqRel);
        let listeners: Vec<Listener<T>> =
            self.listeners.read().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(&value);
        }
    }

    /// Last published value.
    pub fn latest(&self) -> Option<T> {
        self.latest.lock().clone()
    }

    /// Number of publishes so far.
    pub fn publish_count(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(l, _)| *l != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Current value if it matches, else the next matching publish.
    ///
    /// `None` when nothing matching arrives within `timeout`.
    pub fn wait_for<P>(&self, predicate: P, timeout: Duration) -> Option<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        let (tx, rx) = channel::unbounded();
        let filter = predicate.clone();
        // Registered before looking at `latest` so no publish in between is lost.
        let id = self.subscribe(move |value: &T| {
            if filter(value) {
                let _ = tx.send(value.clone());
            }
        });
        let current = self.latest().filter(|v| predicate(v));
        let found = match current {
            Some(v) => Some(v),
            None => rx.recv_timeout(timeout).ok(),
        };
        self.unsubscribe(id);
        found
    }
}

impl<T: Clone + Send + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("published", &self.published.load(Ordering::Relaxed))
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_listeners_receive_in_publish_order() {
        let topic: Observable<u32> = Observable::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = topic.subscribe(move |v| sink.lock().push(*v));
        topic.publish(1);
        topic.publish(2);
        assert!(topic.unsubscribe(id));
        topic.publish(3);
        assert_eq!(*seen.lock(), vec![1, 2]);
        assert_eq!(topic.latest(), Some(3));
        assert_eq!(topic.publish_count(), 3);
    }

    #[test]
    fn test_wait_for_value_from_other_thread() {
        let topic: Arc<Observable<u32>> = Arc::new(Observable::new());
        let publisher = topic.clone();
        let handle = thread::spawn(move || {
            for v in 0..5 {
                publisher.publish(v);
                thread::sleep(Duration::from_millis(5));
            }
        });
        let got = topic.wait_for(|v| *v >= 3, Duration::from_secs(2));
        handle.join().expect("publisher");
        assert!(got.is_some_and(|v| v >= 3));
        assert_eq!(topic.listener_count(), 0);
    }

    #[test]
    fn test_wait_for_times_out() {
        let topic: Observable<u32> = Observable::new();
        topic.publish(1);
        assert_eq!(topic.wait_for(|v| *v == 2, Duration::from_millis(20)), None);
    }

    #[test]
    fn test_listener_may_read_topic() {
        let topic: Arc<Observable<u32>> = Arc::new(Observable::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let (inner, counter) = (topic.clone(), hits.clone());
        topic.subscribe(move |v| {
            assert_eq!(inner.latest(), Some(*v));
            counter.fetch_add(1, Ordering::Relaxed);
        });
        topic.publish(7);
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }
}
