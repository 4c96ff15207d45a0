// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event relay: listener registry plus pending-event buffer.
//
// SDK callbacks can fire before the scripting host has attached a single
// listener (cold start). Those events are buffered in arrival order and
// flushed when the total listener count goes from 0 to 1. While any
// listener is attached, every event is delivered immediately, whether or not
// its own channel has listeners.
//
// Counters, buffer and delivery share one mutex. Sinks are invoked with
// that lock held and must not call back into the relay.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airship_core::types::HostEvent;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Receives events on their way to the host.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: &HostEvent);
}

impl EventSink for UnboundedSender<HostEvent> {
    fn deliver(&self, event: &HostEvent) {
        if self.send(event.clone()).is_err() {
            debug!(channel = %event.channel, "event receiver dropped");
        }
    }
}

#[derive(Default)]
struct RelayState {
    listeners: HashMap<String, usize>,
    pending: VecDeque<HostEvent>,
}

impl RelayState {
    fn total_listeners(&self) -> usize {
        self.listeners.values().sum()
    }
}

/// Process-wide dispatcher between SDK producers and host listeners.
///
/// Construct one per process and share it by handle; [`EventRelay::reset`]
/// restores the initial state for test isolation.
pub struct EventRelay {
    state: Mutex<RelayState>,
    sink: Arc<dyn EventSink>,
    /// `None` buffers without limit.
    capacity: Option<usize>,
}

impl EventRelay {
    /// Relay with an unbounded pending buffer.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self::with_capacity(sink, None)
    }

    /// Relay whose pending buffer drops its oldest event once `capacity` is
    /// reached. `None` means unbounded.
    pub fn with_capacity(sink: Arc<dyn EventSink>, capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(RelayState::default()),
            sink,
            capacity,
        }
    }

    fn state(&self) -> MutexGuard<'_, RelayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register one listener on `channel`. The first listener across all
    /// channels flushes the pending buffer in arrival order.
    pub fn attach(&self, channel: &str) {
        let mut state = self.state();
        let was_idle = state.total_listeners() == 0;
        *state.listeners.entry(channel.to_string()).or_insert(0) += 1;
        info!(channel, "event listener added");

        if was_idle && !state.pending.is_empty() {
            let pending = std::mem::take(&mut state.pending);
            debug!(count = pending.len(), "flushing buffered events");
            for event in &pending {
                self.sink.deliver(event);
            }
        }
    }

    /// Remove `count` listeners from `channel`, flooring at zero.
    pub fn detach(&self, channel: &str, count: usize) {
        let mut state = self.state();
        if let Some(current) = state.listeners.get_mut(channel) {
            *current = current.saturating_sub(count);
            if *current == 0 {
                state.listeners.remove(channel);
            }
        }
        info!(channel, count, "event listeners removed");
    }

    /// Drop every listener registration. Buffered events are kept.
    pub fn detach_all(&self) {
        self.state().listeners.clear();
        info!("all event listeners removed");
    }

    /// Deliver `event` now if any listener is attached, otherwise buffer it.
    pub fn emit(&self, event: impl Into<HostEvent>) {
        let event = event.into();
        let mut state = self.state();

        if state.total_listeners() > 0 {
            self.sink.deliver(&event);
            return;
        }

        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                warn!(channel = %event.channel, "event dropped, buffer disabled");
                return;
            }
            while state.pending.len() >= capacity {
                if let Some(dropped) = state.pending.pop_front() {
                    warn!(channel = %dropped.channel, "buffer full, dropping oldest event");
                }
            }
        }
        debug!(channel = %event.channel, "no listeners, buffering event");
        state.pending.push_back(event);
    }

    /// Clear listeners and the pending buffer.
    pub fn reset(&self) {
        let mut state = self.state();
        state.listeners.clear();
        state.pending.clear();
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.state().listeners.get(channel).copied().unwrap_or(0)
    }

    pub fn total_listeners(&self) -> usize {
        self.state().total_listeners()
    }

    /// Number of events waiting for the first listener.
    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }
}
