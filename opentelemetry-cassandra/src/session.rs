//! Subscription of request-init listeners on a driver session.
use crate::lifecycle::RequestLifecycle;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Called by a session for every request, before the request is dispatched.
pub type RequestInitListener = Arc<dyn Fn(&dyn RequestLifecycle) + Send + Sync + 'static>;

/// Identifies a listener registration so it can be removed again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The parts of a driver session the tracing hook relies on.
pub trait Session: Send + Sync + 'static {
    /// The keyspace the session currently uses by default.
    fn keyspace(&self) -> Option<String>;

    /// Subscribe `listener` to every subsequent request.
    fn add_request_init_listener(&self, listener: RequestInitListener) -> ListenerId;

    /// Remove a subscription. Returns `false` if `id` was not registered.
    fn remove_request_init_listener(&self, id: ListenerId) -> bool;
}

/// Request-init listeners registered on a session.
///
/// Drivers embed one of these and call [`notify`](ListenerRegistry::notify)
/// for each new request.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, RequestInitListener)>>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener and return its registration id.
    pub fn register(&self, listener: RequestInitListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    /// Invoke every listener, in registration order, for `request`.
    ///
    /// Listeners run without the registry lock held, so they may register or
    /// unregister listeners themselves.
    pub fn notify(&self, request: &dyn RequestLifecycle) {
        let listeners: Vec<RequestInitListener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(request);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}
