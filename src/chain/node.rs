//! Chain nodes: the per-link subscription state machine.
//!
//! A node is either a link (watches the property that decides its downstream
//! value's identity, and owns exactly one downstream node) or a terminal
//! (watches the leaf property and reports to the consumer). A node is either
//! unbound, or bound to exactly one live instance with exactly one live
//! subscription; `dispose` is terminal and can never be undone.
//!
//! Locking: each node guards its bind state with its own mutex, making an
//! unbind-then-rebind sequence a critical section. Locks are only ever taken
//! parent before child along a chain, and the consumer callback is invoked
//! after the guard is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

use crate::accessor::Accessor;
use crate::observable::{ListenerId, ObjectRef, ObservableObject};

/// Notifies the consumer that one dependent property may have changed. The
/// dependent property's name is baked in by the registration.
pub(crate) type NotifyFn = Arc<dyn Fn() + Send + Sync>;

enum NodeRole {
    Link {
        accessor: Accessor,
        downstream: Arc<ChainNode>,
    },
    Terminal,
}

struct BindState {
    /// Non-owning handle to the watched instance; dangling once the owner
    /// drops it.
    instance: Option<Weak<dyn ObservableObject>>,
    /// The one live subscription, present exactly while bound.
    subscription: Option<ListenerId>,
    /// Released on dispose so the registration's callback can be dropped.
    notify: Option<NotifyFn>,
    disposed: bool,
}

/// One runtime subscription unit in a bound chain.
pub(crate) struct ChainNode {
    watched: String,
    role: NodeRole,
    state: Mutex<BindState>,
}

impl ChainNode {
    /// Build the innermost node, watching the leaf property.
    pub(crate) fn terminal(watched: String, notify: NotifyFn) -> Arc<Self> {
        Arc::new(Self {
            watched,
            role: NodeRole::Terminal,
            state: Mutex::new(BindState::new(notify)),
        })
    }

    /// Wrap `downstream` with a link watching `watched` on its own instance.
    pub(crate) fn link(
        watched: String,
        accessor: Accessor,
        downstream: Arc<ChainNode>,
        notify: NotifyFn,
    ) -> Arc<Self> {
        Arc::new(Self {
            watched,
            role: NodeRole::Link {
                accessor,
                downstream,
            },
            state: Mutex::new(BindState::new(notify)),
        })
    }

    /// Bind this node (and its whole downstream chain) to `instance`.
    ///
    /// Binding to `Some` subscribes and then, for a link, reads the
    /// downstream value and binds the downstream node to it; for a terminal,
    /// reports to the consumer, since a rebind is itself a reportable change.
    /// Binding to `None` leaves the node unbound and propagates the null
    /// downward without reporting; the upstream node that computed the null
    /// already did.
    pub(crate) fn bind(self: &Arc<Self>, instance: Option<&ObjectRef>) {
        let mut notify = None;
        {
            let mut state = self.lock();
            if state.disposed {
                return;
            }

            // A bind while bound is a rebind: tear down inside-out first.
            self.unbind_locked(&mut state);

            match instance {
                Some(obj) => {
                    state.instance = Some(Arc::downgrade(obj));
                    state.subscription = Some(self.attach(obj));
                    trace!(watched = %self.watched, "node bound");

                    match &self.role {
                        NodeRole::Link {
                            accessor,
                            downstream,
                        } => {
                            let value = accessor(obj.as_ref());
                            if value.is_none() {
                                // The downstream cascade has nothing to
                                // report from; this link reports the null
                                // transition itself.
                                notify = state.notify.clone();
                            }
                            downstream.bind(value.as_ref());
                        }
                        NodeRole::Terminal => {
                            notify = state.notify.clone();
                        }
                    }
                }
                None => {
                    trace!(watched = %self.watched, "node bound to null, staying unbound");
                }
            }
        }

        if let Some(notify) = notify {
            notify();
        }
    }

    /// Detach this node and everything downstream. Idempotent.
    pub(crate) fn unbind(self: &Arc<Self>) {
        let mut state = self.lock();
        self.unbind_locked(&mut state);
    }

    /// Terminal transition: unbind, forget the notify closure, refuse all
    /// further binds. Safe to call more than once.
    pub(crate) fn dispose(self: &Arc<Self>) {
        {
            let mut state = self.lock();
            self.unbind_locked(&mut state);
            state.disposed = true;
            state.notify = None;
        }
        if let NodeRole::Link { downstream, .. } = &self.role {
            downstream.dispose();
        }
        trace!(watched = %self.watched, "node disposed");
    }

    /// Whether the node currently holds a live subscription.
    #[cfg(test)]
    pub(crate) fn is_bound(&self) -> bool {
        self.lock().subscription.is_some()
    }

    /// Change-notification entry point; non-matching property names are
    /// ignored here rather than at the notifier.
    fn on_property_changed(self: &Arc<Self>, property: &str) {
        if property != self.watched {
            return;
        }

        let mut notify = None;
        {
            let mut state = self.lock();
            if state.disposed || state.subscription.is_none() {
                // Raced with dispose/unbind: the delivery was in flight when
                // the subscription went away. Never resurrect anything.
                return;
            }

            match &self.role {
                NodeRole::Terminal => {
                    notify = state.notify.clone();
                }
                NodeRole::Link {
                    accessor,
                    downstream,
                } => {
                    trace!(watched = %self.watched, "link value identity changed, rebinding downstream");
                    downstream.unbind();
                    let value = state
                        .instance
                        .as_ref()
                        .and_then(Weak::upgrade)
                        .and_then(|obj| accessor(obj.as_ref()));
                    if value.is_none() {
                        notify = state.notify.clone();
                    }
                    downstream.bind(value.as_ref());
                }
            }
        }

        if let Some(notify) = notify {
            notify();
        }
    }

    /// Inside-out teardown under the caller's guard: downstream first, then
    /// this node's own subscription.
    fn unbind_locked(self: &Arc<Self>, state: &mut MutexGuard<'_, BindState>) {
        if let NodeRole::Link { downstream, .. } = &self.role {
            downstream.unbind();
        }

        let subscription = state.subscription.take();
        let instance = state.instance.take();
        if let (Some(id), Some(obj)) = (subscription, instance.and_then(|weak| weak.upgrade())) {
            obj.notifier().unsubscribe(id);
            trace!(watched = %self.watched, "node unbound");
        }
    }

    fn attach(self: &Arc<Self>, obj: &ObjectRef) -> ListenerId {
        let weak = Arc::downgrade(self);
        obj.notifier().subscribe(Arc::new(move |property: &str| {
            if let Some(node) = weak.upgrade() {
                node.on_property_changed(property);
            }
        }))
    }

    fn lock(&self) -> MutexGuard<'_, BindState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BindState {
    fn new(notify: NotifyFn) -> Self {
        Self {
            instance: None,
            subscription: None,
            notify: Some(notify),
            disposed: false,
        }
    }
}
