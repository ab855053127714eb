//! Client subscription tracking.
//!
//! Clients register demand with `AddReference` and withdraw it with
//! `RemoveReference`. Subscriptions are kept as an ordered multiset of
//! identities: every subscribe appends one occurrence and every unsubscribe
//! removes the first matching one, so a client that subscribed twice must
//! unsubscribe twice.

mod registry;

pub use registry::ClientRegistry;
