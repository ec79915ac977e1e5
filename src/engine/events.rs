//! Push-based event streams with RAII subscriptions.
//!
//! Single-threaded: streams share their subscriber list through
//! `Rc<RefCell<..>>`. Callbacks run in registration order and only ever see
//! settled form state, since the engine emits after a tick completes.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Subscribers<T> {
    next_id: u64,
    closed: bool,
    entries: Vec<(u64, Callback<T>)>,
}

/// Multicast stream of `T` events.
pub struct EventStream<T> {
    inner: Rc<RefCell<Subscribers<T>>>,
}

impl<T: 'static> EventStream<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Subscribers {
                next_id: 0,
                closed: false,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a callback. Dropping the returned [`Subscription`] removes it.
    ///
    /// Subscribing to a closed stream returns an inert subscription.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        if inner.closed {
            return Subscription { cancel: None };
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Rc::new(callback)));

        let weak: Weak<RefCell<Subscribers<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().entries.retain(|(entry, _)| *entry != id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    pub(crate) fn emit(&self, event: &T) {
        // Snapshot first so a callback dropping its own subscription is safe.
        let callbacks: Vec<Callback<T>> = {
            let inner = self.inner.borrow();
            if inner.closed {
                return;
            }
            inner.entries.iter().map(|(_, cb)| cb.clone()).collect()
        };

        for callback in callbacks {
            callback(event);
        }
    }

    /// Detach every subscriber and refuse new ones.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.closed = true;
        inner.entries.clear();
    }
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventStream")
            .field("subscribers", &inner.entries.len())
            .field("closed", &inner.closed)
            .finish()
    }
}

/// Handle to a registered callback. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.is_active()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_in_registration_order() {
        let stream = EventStream::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let log = log.clone();
            stream.subscribe(move |v| log.borrow_mut().push(("first", *v)))
        };
        let second = {
            let log = log.clone();
            stream.subscribe(move |v| log.borrow_mut().push(("second", *v)))
        };

        stream.emit(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
        drop((first, second));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let stream = EventStream::<u32>::new();
        let hits = Rc::new(Cell::new(0));

        let subscription = {
            let hits = hits.clone();
            stream.subscribe(move |_| hits.set(hits.get() + 1))
        };
        stream.emit(&1);
        drop(subscription);
        stream.emit(&2);

        assert_eq!(hits.get(), 1);
        assert_eq!(stream.subscriber_count(), 0);
    }

    #[test]
    fn test_close_detaches_and_rejects() {
        let stream = EventStream::<u32>::new();
        let hits = Rc::new(Cell::new(0));

        let before = {
            let hits = hits.clone();
            stream.subscribe(move |_| hits.set(hits.get() + 1))
        };
        stream.close();
        let after = stream.subscribe(|_| panic!("closed stream must not deliver"));
        stream.emit(&1);

        assert_eq!(hits.get(), 0);
        assert!(!after.is_active());
        assert!(stream.is_closed());
        before.unsubscribe();
    }

    #[test]
    fn test_subscription_outliving_stream() {
        let stream = EventStream::<u32>::new();
        let subscription = stream.subscribe(|_| {});
        drop(stream);
        subscription.unsubscribe();
    }
}
