//! The observable capability: named property-change notifications.
//!
//! A type participates in dependency chains by exposing a [`ChangeNotifier`]
//! through the [`ObservableObject`] trait. The notifier is deliberately dumb:
//! it delivers every raised property name to every listener on the raising
//! thread, and listeners filter for the names they care about.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

/// Shared handle to a live observable instance.
pub type ObjectRef = Arc<dyn ObservableObject>;

/// Callback invoked with the name of the property that changed.
pub type Listener = Arc<dyn Fn(&str) + Send + Sync>;

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new random listener id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// A live instance that can raise named property-change notifications.
///
/// Implementors embed a [`ChangeNotifier`] and call
/// [`ChangeNotifier::raise`] from their setters. `as_any` exists so property
/// accessors can downcast from the trait object back to the concrete type.
pub trait ObservableObject: Send + Sync {
    /// The registered type name, used to look up the type's descriptor.
    fn type_name(&self) -> &'static str;

    /// Downcast support for accessors.
    fn as_any(&self) -> &dyn Any;

    /// The notifier raising this instance's change notifications.
    fn notifier(&self) -> &ChangeNotifier;
}

/// Listener table for one observable instance.
///
/// `raise` snapshots the table before invoking anyone, so a listener may
/// subscribe or unsubscribe on the same instance from inside its handler
/// without deadlocking the delivery.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Mutex<HashMap<ListenerId, Listener>>,
}

impl ChangeNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and return its id.
    pub fn subscribe(&self, listener: Listener) -> ListenerId {
        let id = ListenerId::new();
        self.lock().insert(id, listener);
        id
    }

    /// Remove a listener. Unknown ids are ignored, so removal is idempotent.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.lock().remove(&id);
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// Notify every listener that `property` changed, on the calling thread.
    pub fn raise(&self, property: &str) {
        let snapshot: Vec<Listener> = self.lock().values().cloned().collect();
        for listener in snapshot {
            listener(property);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ListenerId, Listener>> {
        // A poisoned listener table is still structurally valid.
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn raise_delivers_property_name_to_every_listener() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            notifier.subscribe(Arc::new(move |prop: &str| {
                assert_eq!(prop, "address");
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }

        notifier.raise("address");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let notifier = ChangeNotifier::new();
        let id = notifier.subscribe(Arc::new(|_| {}));
        assert_eq!(notifier.listener_count(), 1);

        notifier.unsubscribe(id);
        notifier.unsubscribe(id);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn listener_may_unsubscribe_itself_during_raise() {
        let notifier = Arc::new(ChangeNotifier::new());
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let id = {
            let inner = Arc::clone(&notifier);
            let slot = Arc::clone(&slot);
            notifier.subscribe(Arc::new(move |_| {
                if let Some(id) = slot.lock().unwrap().take() {
                    inner.unsubscribe(id);
                }
            }))
        };
        *slot.lock().unwrap() = Some(id);

        notifier.raise("x");
        assert_eq!(notifier.listener_count(), 0);

        // A second raise finds no listeners and is a no-op.
        notifier.raise("x");
    }
}
