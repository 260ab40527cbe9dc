//! Node operational state machine with bounded transition history and
//! per-state callbacks, invoked after the transition completes.

use std::collections::HashMap;

pub const MAX_HISTORY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    Initializing,
    WaitingPeers,
    Syncing,
    Synchronized,
    Validating,
    Error,
    ShuttingDown,
}

pub struct StateManager {
    current: NodeState,
    previous: NodeState,
    changed_at: f64,
    history: Vec<(NodeState, f64)>,
    callbacks: HashMap<NodeState, Vec<Box<dyn FnMut()>>>,
}

impl StateManager {
    pub fn new(initial: NodeState, now: f64) -> Self {
        Self {
            current: initial,
            previous: initial,
            changed_at: now,
            history: vec![(initial, now)],
            callbacks: HashMap::new(),
        }
    }

    pub fn current(&self) -> NodeState {
        self.current
    }

    pub fn previous(&self) -> NodeState {
        self.previous
    }

    pub fn duration_in_state(&self, now: f64) -> f64 {
        now - self.changed_at
    }

    pub fn on_enter(&mut self, state: NodeState, callback: impl FnMut() + 'static) {
        self.callbacks.entry(state).or_default().push(Box::new(callback));
    }

    /// No-op (returns `false`) if already in `new_state`. Callbacks for
    /// `new_state` run after the transition and history update complete.
    pub fn transition(&mut self, new_state: NodeState, now: f64) -> bool {
        if new_state == self.current {
            return false;
        }
        tracing::info!(from = ?self.current, to = ?new_state, "node state transition");
        self.previous = self.current;
        self.current = new_state;
        self.changed_at = now;

        self.history.push((new_state, now));
        if self.history.len() > MAX_HISTORY {
            let overflow = self.history.len() - MAX_HISTORY;
            self.history.drain(0..overflow);
        }

        if let Some(callbacks) = self.callbacks.get_mut(&new_state) {
            for callback in callbacks {
                callback();
            }
        }
        true
    }

    pub fn history(&self) -> &[(NodeState, f64)] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn transition_to_same_state_is_a_no_op() {
        let mut sm = StateManager::new(NodeState::Initializing, 0.0);
        assert!(!sm.transition(NodeState::Initializing, 1.0));
        assert_eq!(sm.history().len(), 1);
    }

    #[test]
    fn transition_runs_enter_callback_after_history_update() {
        let mut sm = StateManager::new(NodeState::Initializing, 0.0);
        let entered = Rc::new(Cell::new(false));
        let entered_clone = entered.clone();
        sm.on_enter(NodeState::Synchronized, move || entered_clone.set(true));

        sm.transition(NodeState::Synchronized, 5.0);
        assert!(entered.get());
        assert_eq!(sm.current(), NodeState::Synchronized);
        assert_eq!(sm.previous(), NodeState::Initializing);
    }

    #[test]
    fn history_is_bounded_to_max_history() {
        let mut sm = StateManager::new(NodeState::Initializing, 0.0);
        for i in 0..150 {
            let state = if i % 2 == 0 { NodeState::Syncing } else { NodeState::Synchronized };
            sm.transition(state, i as f64);
        }
        assert_eq!(sm.history().len(), MAX_HISTORY);
    }
}
