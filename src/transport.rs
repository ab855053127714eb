//! The remote-procedure side of the provider.
//!
//! The bus binding itself is external. The controller only needs to complete
//! deferred calls, emit change signals, and ask for liveness notifications
//! about subscribed clients.

use crate::error::Result;
use crate::types::{ClientId, PositionReply, QueryReply, VelocityReply};

/// Change signals emitted on every accepted fix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal {
    PositionChanged(PositionReply),
    VelocityChanged(VelocityReply),
}

/// Context of an incoming bus call.
///
/// `sender` is `None` when a method was invoked directly rather than
/// dispatched by the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Option<ClientId>,
}

impl CallContext {
    pub fn from_sender(sender: ClientId) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// A context with no caller.
    pub fn out_of_band() -> Self {
        Self { sender: None }
    }
}

/// Bus binding used by the session controller.
pub trait Transport: Send {
    /// Handle for a call whose reply is sent later.
    type Call: Send;

    /// Send the reply for a call.
    fn reply(&mut self, call: Self::Call, reply: QueryReply) -> Result<()>;

    fn emit(&mut self, signal: Signal);

    /// Start reporting when `client` leaves the bus.
    fn watch_client(&mut self, client: &ClientId);

    fn unwatch_client(&mut self, client: &ClientId);
}
