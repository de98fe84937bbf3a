//! Single-flight session refresh.
//!
//! At most one refresh runs at a time. Callers that hit a 401 while a refresh
//! is in flight await that same refresh instead of starting another. Each
//! successful refresh bumps a generation counter, so a caller whose request
//! went out before a refresh that has since succeeded can skip straight to
//! replaying.

use crate::ApiError;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::{Arc, Weak};

type RefreshFuture = Shared<BoxFuture<'static, Result<(), ApiError>>>;

#[derive(Default)]
struct GateState {
    inflight: Option<RefreshFuture>,
    generation: u64,
}

/// Shared refresh coordinator. Clones share the same state.
#[derive(Clone, Default)]
pub struct RefreshGate {
    state: Arc<Mutex<GateState>>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refreshes that have succeeded so far.
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().inflight.is_some()
    }

    /// Refresh, or join the refresh already in flight.
    ///
    /// `observed` is the generation read before the failing request was
    /// sent. If a refresh has succeeded since, this returns `Ok` without
    /// refreshing again. `start` is only invoked when a new refresh has to
    /// be launched.
    pub async fn refresh<F, Fut>(&self, observed: Option<u64>, start: F) -> Result<(), ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let refresh = {
            let mut state = self.state.lock();

            if observed.is_some_and(|observed| state.generation > observed) {
                tracing::debug!(
                    generation = state.generation,
                    "Session already refreshed, skipping"
                );
                return Ok(());
            }

            match &state.inflight {
                Some(inflight) => {
                    tracing::debug!("Joining in-flight session refresh");
                    inflight.clone()
                }
                None => {
                    let refresh = Self::launch(Arc::downgrade(&self.state), start());
                    state.inflight = Some(refresh.clone());
                    refresh
                }
            }
        };

        refresh.await
    }

    fn launch<Fut>(state: Weak<Mutex<GateState>>, work: Fut) -> RefreshFuture
    where
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        async move {
            tracing::debug!("Refreshing session");
            let result = work.await;
            if let Some(state) = state.upgrade() {
                let mut state = state.lock();
                state.inflight = None;
                if result.is_ok() {
                    state.generation += 1;
                }
            }
            result
        }
        .boxed()
        .shared()
    }
}
