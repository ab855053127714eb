//! The control thread.
//!
//! [`Service`] owns the [`SessionController`] and runs the only loop that
//! touches it. Everything else talks to it through channels:
//! - the transport sends [`Request`]s through a [`ServiceHandle`]
//! - the hardware sends events through its [`EventSink`]
//! - the idle deadline is a timer channel rebuilt each iteration
//!
//! # Example
//!
//! ```ignore
//! let (service, handle) = Service::new(driver, bus, ProviderConfig::default(), SystemClock);
//! let worker = std::thread::spawn(move || service.run());
//!
//! // From the bus dispatch thread:
//! handle.add_reference(CallContext::from_sender(sender))?;
//! handle.get_position(call)?;
//!
//! match worker.join().unwrap()? {
//!     ExitReason::IdleTimeout => std::process::exit(0),
//!     _ => {}
//! }
//! ```
//!
//! [`SessionController`]: crate::session::SessionController
//! [`EventSink`]: crate::hardware::EventSink

mod handle;
mod runner;

pub use handle::{Request, ServiceHandle};
pub use runner::{ExitReason, Service};
