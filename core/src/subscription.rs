use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::FetchError;

/// One complete restatement of a stream's state.
///
/// `seq` grows with every snapshot the store emits, so a consumer can tell a
/// stale delivery from a fresh one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub seq: u64,
    pub payload: Result<T, FetchError>,
}

impl<T> Snapshot<T> {
    pub fn ok(seq: u64, value: T) -> Self {
        Self {
            seq,
            payload: Ok(value),
        }
    }

    pub fn err(seq: u64, error: FetchError) -> Self {
        Self {
            seq,
            payload: Err(error),
        }
    }
}

type Callback<T> = Rc<dyn Fn(Snapshot<T>)>;

/// Callbacks registered against one stream.
pub(crate) struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T: Clone + 'static> Listeners<T> {
    pub(crate) fn new() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            next_id: 0,
            entries: Vec::new(),
        }))
    }

    /// Registers `callback` and returns it with the handle that removes it.
    pub(crate) fn add(
        this: &Rc<RefCell<Self>>,
        callback: impl Fn(Snapshot<T>) + 'static,
    ) -> (Callback<T>, Subscription) {
        let callback: Callback<T> = Rc::new(callback);
        let id = {
            let mut listeners = this.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, Rc::clone(&callback)));
            id
        };

        let weak: Weak<RefCell<Self>> = Rc::downgrade(this);
        let subscription = Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            }
        });
        (callback, subscription)
    }

    pub(crate) fn len(this: &Rc<RefCell<Self>>) -> usize {
        this.borrow().entries.len()
    }

    /// Delivers `snapshot` to every listener registered when the call began.
    pub(crate) fn emit(this: &Rc<RefCell<Self>>, snapshot: Snapshot<T>) {
        // Callbacks may subscribe or unsubscribe while we iterate.
        let callbacks: Vec<Callback<T>> = this
            .borrow()
            .entries
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }
}

/// Handle for a store subscription. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_listeners_until_dropped() {
        let listeners = Listeners::<u32>::new();
        let seen = Rc::new(Cell::new(0));

        let sink = Rc::clone(&seen);
        let (_, subscription) = Listeners::add(&listeners, move |snap: Snapshot<u32>| {
            sink.set(sink.get() + snap.payload.unwrap_or(0));
        });

        Listeners::emit(&listeners, Snapshot::ok(1, 5));
        assert_eq!(seen.get(), 5);

        drop(subscription);
        assert_eq!(Listeners::len(&listeners), 0);
        Listeners::emit(&listeners, Snapshot::ok(2, 5));
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn test_unsubscribe_after_source_dropped() {
        let listeners = Listeners::<u32>::new();
        let (_, subscription) = Listeners::add(&listeners, |_| {});
        drop(listeners);
        subscription.unsubscribe();
    }
}
