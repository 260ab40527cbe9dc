//! Node orchestrator: a bounded message queue, task scheduler, state
//! machine, and event bus driving one cooperative event loop per node.

pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod message;
pub mod orchestrator;
pub mod scheduler;
pub mod state;

pub use components::Components;
pub use config::{NodeConfig, Role};
pub use error::{NodeError, Result};
pub use events::{Event, EventBus, EventKind};
pub use message::{Message, MessageQueue, QueueStats};
pub use orchestrator::Node;
pub use scheduler::{SchedulerStats, TaskScheduler};
pub use state::{NodeState, StateManager};
