// src/state/request_state.rs
use std::time::{Duration, Instant};

use crate::api::RequestToken;
use crate::config::Query;

#[derive(Debug)]
struct PendingRequest {
    token: RequestToken,
    query: Query,
    started: Instant,
}

/// Owns the single correlation request slot. Starting a request cancels the
/// one it replaces, and only the token in the slot may complete.
#[derive(Debug, Default)]
pub struct RequestCoordinator {
    pending: Option<PendingRequest>,
}

impl RequestCoordinator {
    pub fn begin(&mut self, query: Query) -> RequestToken {
        if let Some(previous) = self.pending.take() {
            log::info!("Cancelling superseded query for {}", previous.query.feature1);
            previous.token.cancel();
        }

        let token = RequestToken::new();
        self.pending = Some(PendingRequest {
            token: token.clone(),
            query,
            started: Instant::now(),
        });
        token
    }

    /// Returns false when nothing was in flight
    pub fn cancel_current(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => {
                pending.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Frees the slot if `token` owns it and hands back the query it was
    /// started for. Any other token is stale.
    pub fn complete(&mut self, token: &RequestToken) -> Option<Query> {
        match &self.pending {
            Some(pending) if pending.token == *token => {
                self.pending.take().map(|pending| pending.query)
            }
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.pending.as_ref().map(|pending| pending.started.elapsed())
    }
}
