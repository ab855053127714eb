//! # Hybris Position Provider
//!
//! A Geoclue position provider that bridges an asynchronous, callback-driven
//! GPS HAL to a reference-counted remote-procedure interface shared by many
//! clients.
//!
//! ## Core Concepts
//!
//! - **Demand**: outstanding client references plus pending queries. The
//!   hardware runs exactly while demand is non-zero.
//! - **Fixes**: delivered by the hardware from its own threads and marshalled
//!   onto a single control thread.
//! - **Pending queries**: `GetPosition`/`GetVelocity` calls that arrive while
//!   the last fix is stale are answered by the next fix, in arrival order.
//! - **Idle shutdown**: with no demand for the grace period, the service
//!   exits.
//!
//! ## Example
//!
//! ```ignore
//! use hybris_provider::{CallContext, ClientId, ProviderConfig, Service, SystemClock};
//!
//! let (service, handle) = Service::new(driver, bus, ProviderConfig::default(), SystemClock);
//! let worker = std::thread::spawn(move || service.run());
//!
//! handle.add_reference(CallContext::from_sender(ClientId::new(":1.42")))?;
//! handle.get_position(call)?;
//! ```

pub mod clients;
pub mod clock;
pub mod config;
pub mod error;
pub mod hardware;
pub mod queries;
pub mod service;
pub mod session;
pub mod testing;
pub mod timer;
pub mod transport;
pub mod types;

// Re-exports
pub use clients::ClientRegistry;
pub use clock::{Clock, SystemClock};
pub use config::ProviderConfig;
pub use error::{ProviderError, Result};
pub use hardware::{
    AcquisitionParams, Capabilities, EventSink, HardwareEvent, LocationFlags, PositionMode,
    PositionSource, RawFix, Recurrence,
};
pub use queries::{PendingQuery, PendingQueryQueue};
pub use service::{ExitReason, Request, Service, ServiceHandle};
pub use session::{QueryOutcome, SessionController};
pub use timer::{IdleTimer, TimerState};
pub use transport::{CallContext, Signal, Transport};
pub use types::*;
