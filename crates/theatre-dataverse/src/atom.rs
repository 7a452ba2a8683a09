//! Reactive cells.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::DataverseError;
use crate::pointer::{Pointer, Traverse};
use crate::value::Value;

static NEXT_ATOM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`Atom`]; the root of its pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomId(u64);

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "atom#{}", self.0)
    }
}

/// Handle returned by [`Atom::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Box<dyn FnMut(&T)>;

/// A cell holding one value.
///
/// `set` replaces the value and calls every observer synchronously, in
/// registration order, before returning.
pub struct Atom<T> {
    id: AtomId,
    value: T,
    observers: Vec<(SubscriptionId, Observer<T>)>,
    next_subscription: u64,
}

impl<T> Atom<T> {
    pub fn new(value: T) -> Self {
        Self {
            id: AtomId(NEXT_ATOM_ID.fetch_add(1, Ordering::Relaxed)),
            value,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn id(&self) -> AtomId {
        self.id
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        let value = &self.value;
        for (_, observer) in &mut self.observers {
            observer(value);
        }
    }

    pub fn reduce<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Pointer to the whole value of this atom.
    pub fn pointer(&self) -> Pointer<AtomId> {
        Pointer::new(self.id)
    }
}

impl<T: Traverse> Atom<T> {
    /// Resolve one of this atom's pointers against its current value.
    pub fn val(&self, pointer: &Pointer<AtomId>) -> Result<Option<Value>, DataverseError> {
        if *pointer.root() != self.id {
            return Err(DataverseError::ForeignPointer {
                atom: self.id,
                pointer_root: *pointer.root(),
            });
        }
        Ok(pointer.resolve(&self.value))
    }
}

impl<T: fmt::Debug> fmt::Debug for Atom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("id", &self.id)
            .field("value", &self.value)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn observers_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut atom = Atom::new(0);

        let first = Rc::clone(&log);
        atom.subscribe(move |v: &i32| first.borrow_mut().push(format!("first {v}")));
        let second = Rc::clone(&log);
        atom.subscribe(move |v: &i32| second.borrow_mut().push(format!("second {v}")));

        atom.set(1);
        atom.reduce(|v| v + 1);

        assert_eq!(
            *log.borrow(),
            vec!["first 1", "second 1", "first 2", "second 2"]
        );
    }

    #[test]
    fn unsubscribed_observers_stop_receiving() {
        let count = Rc::new(RefCell::new(0));
        let mut atom = Atom::new("a");
        let seen = Rc::clone(&count);
        let id = atom.subscribe(move |_| *seen.borrow_mut() += 1);

        atom.set("b");
        assert!(atom.unsubscribe(id));
        assert!(!atom.unsubscribe(id));
        atom.set("c");

        assert_eq!(*count.borrow(), 1);
        assert_eq!(atom.observer_count(), 0);
        assert_eq!(*atom.get(), "c");
    }

    #[test]
    fn val_rejects_pointers_of_other_atoms() {
        let atom = Atom::new(Value::from_entries([("k", 1)]));
        let other = Atom::new(Value::object());

        assert_eq!(atom.val(&atom.pointer().key("k")).unwrap(), Some(Value::from(1)));
        assert!(matches!(
            atom.val(&other.pointer()),
            Err(DataverseError::ForeignPointer { .. })
        ));
        assert_ne!(atom.id(), other.id());
    }
}
