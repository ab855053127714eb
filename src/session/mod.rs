//! Session lifecycle.
//!
//! The [`SessionController`] ties the client registry, the pending query
//! queue, the idle timer, and the hardware source together. It must only be
//! driven from one thread; see [`crate::service`] for the event loop that
//! does so.

mod controller;

pub use controller::{QueryOutcome, SessionController};
