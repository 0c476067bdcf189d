//! The request lifecycle contract between a driver and its listeners.
use crate::statement::Statement;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Error type handed to [`ErrorCallback`]s.
pub type RequestError = dyn Error + Send + Sync + 'static;

/// Invoked once when a request completes successfully.
pub type SuccessCallback = Box<dyn FnOnce() + Send + 'static>;

/// Invoked once when a request fails.
pub type ErrorCallback = Box<dyn FnOnce(&RequestError) + Send + 'static>;

/// One in-flight request, as seen by request-init listeners.
///
/// Implementations must invoke, for every pair registered through
/// [`add_callbacks`](RequestLifecycle::add_callbacks), exactly one of the two
/// callbacks exactly once. Completion may happen on any thread.
pub trait RequestLifecycle: Send + Sync {
    /// The statement being executed.
    fn query(&self) -> &Statement;

    /// Whether more result pages are pending for this request.
    fn has_more_pages(&self) -> bool {
        false
    }

    /// Register completion callbacks.
    fn add_callbacks(&self, on_success: SuccessCallback, on_error: ErrorCallback);
}

enum State {
    Pending(Vec<(SuccessCallback, ErrorCallback)>),
    Succeeded,
    Failed(Arc<RequestError>),
}

/// A [`RequestLifecycle`] drivers can hand to listeners.
///
/// The future moves from pending to either succeeded or failed exactly once.
/// Callbacks registered after that point run immediately with the recorded
/// outcome.
pub struct ResponseFuture {
    query: Statement,
    has_more_pages: AtomicBool,
    state: Mutex<State>,
}

impl ResponseFuture {
    /// Create a pending future for `query`.
    pub fn new(query: impl Into<Statement>) -> Self {
        ResponseFuture {
            query: query.into(),
            has_more_pages: AtomicBool::new(false),
            state: Mutex::new(State::Pending(Vec::new())),
        }
    }

    /// Record whether the server reported more pages.
    pub fn set_has_more_pages(&self, has_more_pages: bool) {
        self.has_more_pages.store(has_more_pages, Ordering::Release);
    }

    /// Whether the request has completed.
    pub fn is_done(&self) -> bool {
        !matches!(*self.lock_state(), State::Pending(_))
    }

    /// Complete the request successfully.
    ///
    /// Returns `false` without running anything if it was already completed.
    pub fn set_result(&self) -> bool {
        let callbacks = match self.complete(State::Succeeded) {
            Some(callbacks) => callbacks,
            None => return false,
        };
        for (on_success, _) in callbacks {
            on_success();
        }
        true
    }

    /// Fail the request with `err`.
    ///
    /// Returns `false` without running anything if it was already completed.
    pub fn set_error<E>(&self, err: E) -> bool
    where
        E: Into<Box<RequestError>>,
    {
        let err: Arc<RequestError> = Arc::from(err.into());
        let callbacks = match self.complete(State::Failed(Arc::clone(&err))) {
            Some(callbacks) => callbacks,
            None => return false,
        };
        for (_, on_error) in callbacks {
            on_error(&*err);
        }
        true
    }

    // Swaps in the terminal state and hands back the pending callbacks, which
    // must run after the lock is released.
    fn complete(&self, outcome: State) -> Option<Vec<(SuccessCallback, ErrorCallback)>> {
        let mut state = self.lock_state();
        if !matches!(*state, State::Pending(_)) {
            return None;
        }
        match std::mem::replace(&mut *state, outcome) {
            State::Pending(callbacks) => Some(callbacks),
            _ => None,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RequestLifecycle for ResponseFuture {
    fn query(&self) -> &Statement {
        &self.query
    }

    fn has_more_pages(&self) -> bool {
        self.has_more_pages.load(Ordering::Acquire)
    }

    fn add_callbacks(&self, on_success: SuccessCallback, on_error: ErrorCallback) {
        let mut state = self.lock_state();
        let failure = match &mut *state {
            State::Pending(callbacks) => {
                callbacks.push((on_success, on_error));
                return;
            }
            State::Succeeded => None,
            State::Failed(err) => Some(Arc::clone(err)),
        };
        drop(state);

        match failure {
            Some(err) => on_error(&*err),
            None => on_success(),
        }
    }
}

impl fmt::Debug for ResponseFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.lock_state() {
            State::Pending(callbacks) => format!("Pending({} callbacks)", callbacks.len()),
            State::Succeeded => "Succeeded".to_string(),
            State::Failed(err) => format!("Failed({err})"),
        };
        f.debug_struct("ResponseFuture")
            .field("query", &self.query)
            .field("has_more_pages", &self.has_more_pages())
            .field("state", &state)
            .finish()
    }
}
