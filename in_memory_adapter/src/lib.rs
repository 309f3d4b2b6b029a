use std::sync::{Arc, PoisonError, RwLock};

/// Process-local cell holding at most one shared value.
///
/// Readers take the read side of the lock and never block each other,
/// writers are serialized and the last one wins.
#[derive(Debug)]
pub struct InMemorySlot<T: ?Sized> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> InMemorySlot<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// Stores `value` and returns whatever was there before.
    pub fn replace(&self, value: Option<Arc<T>>) -> Option<Arc<T>> {
        let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, value)
    }

    /// Returns a clone of the stored pointer, never a copy of the value.
    pub fn get(&self) -> Option<Arc<T>> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<T: ?Sized> Default for InMemorySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Debug;
    use std::thread;

    #[test]
    fn new_slot_is_empty() {
        let slot: InMemorySlot<String> = InMemorySlot::new();
        assert!(slot.get().is_none());
        assert!(!slot.is_set());
    }

    #[test]
    fn replace_returns_previous_value() {
        let slot = InMemorySlot::new();
        let first = Arc::new(1);
        let second = Arc::new(2);

        assert!(slot.replace(Some(Arc::clone(&first))).is_none());
        let previous = slot.replace(Some(Arc::clone(&second))).unwrap();
        assert!(Arc::ptr_eq(&previous, &first));
        assert!(Arc::ptr_eq(&slot.get().unwrap(), &second));
    }

    #[test]
    fn get_preserves_identity() {
        let slot = InMemorySlot::new();
        let value = Arc::new(String::from("broker"));
        slot.replace(Some(Arc::clone(&value)));

        let fetched = slot.get().unwrap();
        assert!(Arc::ptr_eq(&fetched, &value));
    }

    #[test]
    fn supports_unsized_values() {
        let slot: InMemorySlot<dyn Debug + Send + Sync> = InMemorySlot::new();
        slot.replace(Some(Arc::new(42_u32)));
        assert_eq!(format!("{:?}", slot.get().unwrap()), "42");
    }

    #[test]
    fn replace_with_none_clears_slot() {
        let slot = InMemorySlot::new();
        slot.replace(Some(Arc::new("value")));
        slot.replace(None);
        assert!(!slot.is_set());
    }

    #[test]
    fn survives_poisoned_lock() {
        let slot = Arc::new(InMemorySlot::new());
        slot.replace(Some(Arc::new(7)));

        let poisoner = Arc::clone(&slot);
        let _ = thread::spawn(move || {
            let _guard = poisoner.value.write().unwrap();
            panic!("poison the slot");
        })
        .join();

        assert_eq!(slot.get().as_deref(), Some(&7));
        slot.replace(Some(Arc::new(8)));
        assert_eq!(slot.get().as_deref(), Some(&8));
    }
}
