// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

type Callback = Box<dyn FnOnce(bool) + Send>;

#[derive(Default)]
struct State {
    outcome: Option<bool>,
    callbacks: Vec<Callback>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

/// The outcome of an asynchronous operation: pending until resolved exactly
/// once as either a success or a failure.
///
/// Clones share the same state; resolving any clone resolves all of them.
#[derive(Clone, Default)]
pub struct Completion {
    inner: Arc<Inner>,
}

impl Completion {
    /// A pending completion.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeeded() -> Self {
        let completion = Self::new();
        completion.succeed();
        completion
    }

    pub fn failed() -> Self {
        let completion = Self::new();
        completion.fail();
        completion
    }

    /// Resolves as a success. Has no effect if already resolved.
    pub fn succeed(&self) -> &Self {
        self.complete(true);
        self
    }

    /// Resolves as a failure. Has no effect if already resolved.
    pub fn fail(&self) -> &Self {
        self.complete(false);
        self
    }

    fn complete(&self, success: bool) {
        let callbacks = {
            let mut state = self.inner.state.lock();
            if state.outcome.is_some() {
                return;
            }
            state.outcome = Some(success);
            std::mem::take(&mut state.callbacks)
        };
        self.inner.cond.notify_all();
        for callback in callbacks {
            callback(success);
        }
    }

    pub fn is_done(&self) -> bool {
        self.inner.state.lock().outcome.is_some()
    }

    /// True only once resolved as a success.
    pub fn is_success(&self) -> bool {
        self.inner.state.lock().outcome == Some(true)
    }

    /// Blocks until resolved or until `timeout` elapses, and returns `self`
    /// for chaining with [`Completion::is_success`].
    pub fn join(&self, timeout: Duration) -> &Self {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.inner.state.lock();
        while state.outcome.is_none() {
            match deadline {
                Some(deadline) => {
                    if self.inner.cond.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                None => self.inner.cond.wait(&mut state),
            }
        }
        self
    }

    /// Runs `callback` with the outcome once resolved. When already
    /// resolved, it runs on the calling thread before this returns.
    pub fn when_complete<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(bool) + Send + 'static,
    {
        let outcome = {
            let mut state = self.inner.state.lock();
            match state.outcome {
                Some(outcome) => outcome,
                None => {
                    state.callbacks.push(Box::new(callback));
                    return self;
                }
            }
        };
        callback(outcome);
        self
    }

    /// A completion which succeeds once every input has succeeded, and fails
    /// once all have resolved and any of them failed. Succeeds immediately
    /// for no inputs.
    pub fn of_all<I>(completions: I) -> Completion
    where
        I: IntoIterator<Item = Completion>,
    {
        let completions: Vec<Completion> = completions.into_iter().collect();
        if completions.is_empty() {
            return Completion::succeeded();
        }
        let result = Completion::new();
        let pending = Arc::new(AtomicUsize::new(completions.len()));
        let failed = Arc::new(AtomicBool::new(false));
        for completion in completions {
            let result = result.clone();
            let pending = pending.clone();
            let failed = failed.clone();
            completion.when_complete(move |success| {
                if !success {
                    failed.store(true, Ordering::SeqCst);
                }
                if pending.fetch_sub(1, Ordering::SeqCst) == 1 {
                    if failed.load(Ordering::SeqCst) {
                        result.fail();
                    } else {
                        result.succeed();
                    }
                }
            });
        }
        result
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.inner.state.lock().outcome;
        f.debug_struct("Completion").field("outcome", &outcome).finish()
    }
}
