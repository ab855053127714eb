//! Abstraction over the GPS hardware backend.
//!
//! The hardware driver is an external collaborator. This module defines:
//! - The [`PositionSource`] trait the session controller drives
//! - The [`HardwareEvent`]s a source delivers asynchronously
//! - The [`EventSink`] that marshals those events from driver threads onto
//!   the single control thread
//! - An adapter from raw HAL fixes ([`RawFix`]) to [`LocationSample`]s
//!
//! A source may deliver events from any thread and at any time, including
//! before `start()` has returned or after `stop()` was requested.
//!
//! # Example
//!
//! ```ignore
//! struct Driver { sink: Option<EventSink> }
//!
//! impl PositionSource for Driver {
//!     fn initialize(&mut self, events: EventSink) -> Result<Capabilities> {
//!         self.sink = Some(events);
//!         Ok(Capabilities::base())
//!     }
//!     // ...
//! }
//!
//! // Later, from the driver's callback thread:
//! sink.deliver_raw_fix(&raw);
//! ```
//!
//! [`LocationSample`]: crate::types::LocationSample

mod events;
mod source;

pub use events::{
    GpsStatusValue, HardwareEvent, LocationFlags, PhoneContextRequest, PhoneContextSettings,
    RawFix,
};
pub use source::{
    AcquisitionParams, Capabilities, EventSink, PositionMode, PositionSource, Recurrence,
};
