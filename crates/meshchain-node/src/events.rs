//! Event bus: event-kind to handler-list dispatch. Handlers run
//! synchronously and are isolated from each other — a panicking handler
//! increments the error counter instead of taking down the loop.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PeerDiscovered,
    PeerLost,
    MessageReceived,
    SyncStarted,
    SyncCompleted,
    BlockReceived,
    BlockValidated,
    BlockAdded,
    TransactionReceived,
    TransactionAdded,
    ConsensusRoundStart,
    ValidatorSelected,
    WalletUnlocked,
    WalletLocked,
    NodeStarted,
    NodeStopped,
    NodeError,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub source: String,
    pub timestamp: f64,
}

impl Event {
    pub fn new(kind: EventKind, source: impl Into<String>, now: f64) -> Self {
        Self {
            kind,
            source: source.into(),
            timestamp: now,
        }
    }
}

#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Box<dyn FnMut(&Event)>>>,
    pub events_processed: u64,
    pub errors: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: EventKind, handler: impl FnMut(&Event) + 'static) {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    pub fn emit(&mut self, event: Event) {
        if let Some(handlers) = self.handlers.get_mut(&event.kind) {
            for handler in handlers {
                let result = panic::catch_unwind(AssertUnwindSafe(|| handler(&event)));
                if result.is_err() {
                    self.errors += 1;
                }
            }
        }
        self.events_processed += 1;
    }
}
