//! Single-threaded cooperative node orchestrator tying the message
//! queue, task scheduler, state machine, and event bus into one loop.
//! `run_once`/`run` take an explicit clock reading rather than reading
//! the system clock so the loop is deterministic under test; a binary
//! built on top of this crate supplies wall-clock time each tick.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::events::{Event, EventBus, EventKind};
use crate::message::{Message, MessageQueue, DEFAULT_MAX_QUEUE_SIZE};
use crate::scheduler::TaskScheduler;
use crate::state::{NodeState, StateManager};

pub struct Node {
    pub queue: MessageQueue,
    pub scheduler: TaskScheduler,
    pub state: StateManager,
    pub events: EventBus,
    message_handlers: HashMap<String, Box<dyn FnMut(&Message, &mut EventBus)>>,
    running: Rc<Cell<bool>>,
    messages_processed: u64,
}

impl Node {
    pub fn new(now: f64) -> Self {
        Self {
            queue: MessageQueue::new(DEFAULT_MAX_QUEUE_SIZE),
            scheduler: TaskScheduler::new(),
            state: StateManager::new(NodeState::Initializing, now),
            events: EventBus::new(),
            message_handlers: HashMap::new(),
            running: Rc::new(Cell::new(false)),
            messages_processed: 0,
        }
    }

    /// A cloneable flag a scheduled task or external caller can flip to
    /// stop the loop from inside a callback, mirroring `stop()`.
    pub fn stop_handle(&self) -> Rc<Cell<bool>> {
        self.running.clone()
    }

    pub fn on_message(&mut self, kind: impl Into<String>, handler: impl FnMut(&Message, &mut EventBus) + 'static) {
        self.message_handlers.insert(kind.into(), Box::new(handler));
    }

    pub fn enqueue(&mut self, message: Message) -> bool {
        self.queue.enqueue(message)
    }

    fn dispatch(&mut self, message: Message) {
        tracing::debug!(kind = %message.kind, "dispatching message");
        if let Some(handler) = self.message_handlers.get_mut(&message.kind) {
            handler(&message, &mut self.events);
        }
        self.events.emit(Event::new(EventKind::MessageReceived, message.kind.clone(), message.enqueued_at));
        self.messages_processed += 1;
    }

    /// Executes every ready scheduled task, then dequeues and dispatches
    /// at most one message. Returns `true` if a message was processed.
    pub fn run_once(&mut self, now: f64) -> bool {
        self.scheduler.run_ready(now);
        match self.queue.dequeue() {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Loops `run_once` until [`Node::stop`] is called or `duration` has
    /// elapsed, advancing the clock by `tick` each iteration starting
    /// from `start`.
    pub fn run(&mut self, start: f64, duration: f64, tick: f64) {
        tracing::info!(start, duration, tick, "node event loop starting");
        self.running.set(true);
        let mut now = start;
        loop {
            if !self.running.get() {
                break;
            }
            self.run_once(now);
            now += tick;
            if duration > 0.0 && now - start > duration {
                break;
            }
        }
        tracing::info!(messages_processed = self.messages_processed, "node event loop stopped");
    }

    pub fn stop(&mut self) {
        tracing::debug!("stop requested");
        self.running.set(false);
    }

    pub fn messages_processed(&self) -> u64 {
        self.messages_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn run_once_executes_ready_tasks_before_dispatching_a_message() {
        let mut node = Node::new(0.0);
        let order = Rc::new(Cell::new(Vec::<&'static str>::new()));

        let order_task = order.clone();
        node.scheduler.schedule("t", 0.0, 0.0, move || {
            let mut v = order_task.take();
            v.push("task");
            order_task.set(v);
        });

        let order_handler = order.clone();
        node.on_message("ping", move |_, _| {
            let mut v = order_handler.take();
            v.push("message");
            order_handler.set(v);
        });
        node.enqueue(Message::new("ping", vec![], None, 0.0));

        node.run_once(0.0);
        assert_eq!(order.take(), vec!["task", "message"]);
    }

    #[test]
    fn run_once_processes_at_most_one_message_per_call() {
        let mut node = Node::new(0.0);
        node.enqueue(Message::new("a", vec![], None, 0.0));
        node.enqueue(Message::new("b", vec![], None, 0.0));
        assert!(node.run_once(0.0));
        assert_eq!(node.queue.len(), 1);
    }

    #[test]
    fn run_stops_when_a_task_flips_the_stop_handle() {
        let mut node = Node::new(0.0);
        let stop_flag = node.stop_handle();
        // One-shot task whose `next_run` (the `now` argument to `schedule`)
        // is set in the future relative to the loop's start.
        node.scheduler.schedule("stopper", 0.0, 3.0, move || stop_flag.set(false));

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        node.scheduler.schedule("tick", 1.0, 0.0, move || runs_clone.set(runs_clone.get() + 1));

        node.run(0.0, 100.0, 1.0);
        assert_eq!(runs.get(), 4);
    }

    #[test]
    fn run_respects_duration_bound() {
        let mut node = Node::new(0.0);
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        node.scheduler.schedule("tick", 1.0, 0.0, move || runs_clone.set(runs_clone.get() + 1));
        node.run(0.0, 5.0, 1.0);
        assert!(runs.get() >= 4 && runs.get() <= 6);
    }
}
