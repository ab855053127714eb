//! Deferred synchronous queries.
//!
//! A `GetPosition` or `GetVelocity` call that arrives while the last fix is
//! stale is parked here until the next fix. Every call parked at that point
//! is answered from the same sample, in arrival order.

mod queue;

pub use queue::{PendingQuery, PendingQueryQueue};
