//! Router dedup/flood control, routing table, peer manager with
//! reputation, and the priority propagator.

pub mod peer;
pub mod propagator;
pub mod reputation;
pub mod route;
pub mod router;

pub use peer::{PeerInfo, PeerManager};
pub use propagator::{BlockPropagator, PriorityQueues, Priority, RateLimiter};
pub use reputation::{Reputation, ReputationEvent};
pub use route::{Route, RouteExpiredHook, RoutingTable};
pub use router::Router;
