//! Push-based read subscriptions.
//!
//! # Responsibility
//! - Cache the latest value of one live query.
//! - Replay it to each new subscriber, then deliver every later publish.
//!
//! # Invariants
//! - Each subscriber gets its own copy of every value published after it
//!   attached; subscribers never share a receive queue.
//! - Dropping a [`Subscription`] detaches it; it no longer counts as a
//!   subscriber and its sender is pruned on the next publish or count.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

struct Subscriber<T> {
    tx: Sender<T>,
    alive: Weak<()>,
}

impl<T> Subscriber<T> {
    fn is_alive(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

struct PublisherState<T> {
    current: T,
    subscribers: Vec<Subscriber<T>>,
}

/// Latest-value publisher with replay on attach.
pub struct Publisher<T> {
    state: Mutex<PublisherState<T>>,
}

impl<T: Clone + PartialEq> Publisher<T> {
    pub fn new(initial: T) -> Self {
        Self {
            state: Mutex::new(PublisherState {
                current: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Attaches a subscriber. Its first `recv` yields the current value.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        let alive = Arc::new(());
        let mut state = self.lock();
        // Receiver is alive, the send cannot fail.
        let _ = tx.send(state.current.clone());
        state.subscribers.push(Subscriber {
            tx,
            alive: Arc::downgrade(&alive),
        });
        Subscription { rx, _alive: alive }
    }

    /// Replaces the current value and delivers it to live subscribers.
    ///
    /// Returns `false` without delivering when `value` equals the current one.
    pub fn publish(&self, value: T) -> bool {
        let mut state = self.lock();
        if state.current == value {
            return false;
        }
        state.subscribers.retain(|subscriber| {
            subscriber.is_alive() && subscriber.tx.send(value.clone()).is_ok()
        });
        state.current = value;
        true
    }

    pub fn current(&self) -> T {
        self.lock().current.clone()
    }

    /// Number of live subscribers. Dropped ones are pruned here.
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(Subscriber::is_alive);
        state.subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, PublisherState<T>> {
        // Poisoning only means a clone panicked mid-publish; the cached value is still whole.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiving end of one subscription.
pub struct Subscription<T> {
    rx: Receiver<T>,
    _alive: Arc<()>,
}

impl<T> Subscription<T> {
    /// Blocks until the next value. `None` once the publisher is gone.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Some(value),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Returns a pending value without blocking.
    pub fn try_recv(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains pending values and returns the newest one.
    pub fn latest(&self) -> Option<T> {
        let mut newest = None;
        while let Some(value) = self.try_recv() {
            newest = Some(value);
        }
        newest
    }

    /// Iterates pending values without blocking.
    pub fn pending(&self) -> impl Iterator<Item = T> + '_ {
        self.rx.try_iter()
    }
}

impl<T> Iterator for Subscription<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.recv()
    }
}
