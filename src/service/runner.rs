//! The event loop.

use crate::clock::Clock;
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::hardware::{EventSink, HardwareEvent, PositionSource};
use crate::session::SessionController;
use crate::transport::Transport;
use crossbeam_channel::{after, never, select, unbounded, Receiver};
use tracing::{debug, error, info};

use super::handle::{Request, ServiceHandle};

/// Why [`Service::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// No demand for the whole grace period.
    IdleTimeout,
    /// A `Shutdown` request was received.
    ShutdownRequested,
    /// Every [`ServiceHandle`] was dropped.
    Disconnected,
}

/// The provider service: a session controller plus its inbound channels.
pub struct Service<S, T: Transport, K> {
    controller: SessionController<S, T, K>,
    requests: Receiver<Request<T::Call>>,
    hardware: Receiver<HardwareEvent>,
    /// Keeps the hardware channel open even if the source drops its sink.
    events: EventSink,
}

impl<S, T, K> Service<S, T, K>
where
    S: PositionSource,
    T: Transport,
    K: Clock,
{
    /// Build the service and initialize the hardware.
    pub fn new(
        source: S,
        transport: T,
        config: ProviderConfig,
        clock: K,
    ) -> (Self, ServiceHandle<T::Call>) {
        let (request_tx, request_rx) = unbounded();
        let (hardware_tx, hardware_rx) = unbounded();
        let events = EventSink::new(hardware_tx);

        let controller = SessionController::new(source, transport, config, clock, events.clone());

        let service = Self {
            controller,
            requests: request_rx,
            hardware: hardware_rx,
            events,
        };
        (service, ServiceHandle::new(request_tx))
    }

    pub fn controller(&self) -> &SessionController<S, T, K> {
        &self.controller
    }

    /// Another handle onto the hardware event channel.
    pub fn event_sink(&self) -> EventSink {
        self.events.clone()
    }

    /// Run until idle timeout, shutdown, or disconnection, then release the
    /// hardware.
    ///
    /// Returns an error only for fatal misuse (a reference call made outside
    /// the transport).
    pub fn run(self) -> Result<ExitReason> {
        let Service {
            mut controller,
            requests,
            hardware,
            events: _events,
        } = self;

        info!(status = ?controller.status(), "Position provider running");
        let result = event_loop(&mut controller, &requests, &hardware);
        controller.shutdown();

        match &result {
            Ok(reason) => info!(?reason, "Position provider exiting"),
            Err(err) => error!(error = %err, "Position provider aborting"),
        }
        result
    }
}

fn event_loop<S, T, K>(
    controller: &mut SessionController<S, T, K>,
    requests: &Receiver<Request<T::Call>>,
    hardware: &Receiver<HardwareEvent>,
) -> Result<ExitReason>
where
    S: PositionSource,
    T: Transport,
    K: Clock,
{
    loop {
        let idle = match controller.idle_remaining() {
            Some(remaining) => after(remaining),
            None => never(),
        };

        select! {
            recv(requests) -> request => match request {
                Ok(request) => {
                    if let Some(reason) = dispatch(controller, request)? {
                        return Ok(reason);
                    }
                }
                Err(_) => return Ok(ExitReason::Disconnected),
            },
            recv(hardware) -> event => {
                if let Ok(event) = event {
                    controller.on_hardware_event(event);
                }
            }
            recv(idle) -> _ => {
                if controller.poll_idle() {
                    return Ok(ExitReason::IdleTimeout);
                }
            }
        }
    }
}

fn dispatch<S, T, K>(
    controller: &mut SessionController<S, T, K>,
    request: Request<T::Call>,
) -> Result<Option<ExitReason>>
where
    S: PositionSource,
    T: Transport,
    K: Clock,
{
    match request {
        Request::AddReference(context) => controller.add_reference(&context)?,
        Request::RemoveReference(context) => controller.remove_reference(&context)?,
        Request::ClientVanished(client) => controller.client_vanished(&client),
        Request::GetPosition(call) => {
            controller.get_position(call);
        }
        Request::GetVelocity(call) => {
            controller.get_velocity(call);
        }
        Request::GetStatus(reply) => {
            let _ = reply.send(controller.status());
        }
        Request::GetProviderInfo(reply) => {
            let _ = reply.send(controller.provider_info().clone());
        }
        Request::SetOptions(options) => controller.set_options(&options),
        Request::Shutdown => {
            debug!("Shutdown requested");
            return Ok(Some(ExitReason::ShutdownRequested));
        }
    }
    Ok(None)
}
