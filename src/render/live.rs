//! Background rendering where only the newest request counts
//!
//! Every request bumps a generation counter and renders on the blocking
//! pool. A finished render is published only while its generation is still
//! the newest; the check and the publish happen under the channel's lock.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{RenderedDocument, Renderer};
use crate::error::RenderError;

/// A published render
#[derive(Debug, Clone)]
pub struct LiveOutput {
    pub generation: u64,
    pub result: Result<RenderedDocument, RenderError>,
}

/// Observable state of a [`LiveRenderer`]
#[derive(Debug, Clone, Default)]
pub struct LiveState {
    /// Generation of the newest request
    pub requested: u64,
    /// Renders started and not yet finished
    pub in_flight: usize,
    pub latest: Option<Arc<LiveOutput>>,
}

#[derive(Debug, Clone)]
pub struct LiveRenderer {
    renderer: Renderer,
    state: Arc<watch::Sender<LiveState>>,
}

/// Decrements the in-flight count when a render ends, however it ends
struct InFlight {
    state: Arc<watch::Sender<LiveState>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.state
            .send_modify(|state| state.in_flight = state.in_flight.saturating_sub(1));
    }
}

impl LiveRenderer {
    pub fn new(renderer: Renderer) -> Self {
        let (state, _) = watch::channel(LiveState::default());
        Self {
            renderer,
            state: Arc::new(state),
        }
    }

    /// Start rendering `body`, superseding every earlier request.
    ///
    /// The task resolves to whether its result was published.
    pub fn request(&self, body: impl Into<String>) -> JoinHandle<bool> {
        let body = body.into();
        let mut generation = 0;
        self.state.send_modify(|state| {
            state.requested += 1;
            state.in_flight += 1;
            generation = state.requested;
        });
        tracing::debug!("Live render {} requested", generation);

        let guard = InFlight {
            state: self.state.clone(),
        };
        let renderer = self.renderer.clone();
        let state = self.state.clone();

        tokio::task::spawn_blocking(move || {
            let _guard = guard;

            if state.borrow().requested != generation {
                return false;
            }

            let result = renderer.render(&body);
            let published = state.send_if_modified(|state| {
                if state.requested != generation {
                    return false;
                }
                state.latest = Some(Arc::new(LiveOutput { generation, result }));
                true
            });

            if !published {
                tracing::debug!("Live render {} superseded", generation);
            }
            published
        })
    }

    /// Discard every request still running; nothing is published for them
    pub fn cancel(&self) {
        self.state.send_if_modified(|state| {
            state.requested += 1;
            false
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().in_flight > 0
    }

    pub fn latest(&self) -> Option<Arc<LiveOutput>> {
        self.state.borrow().latest.clone()
    }
}
